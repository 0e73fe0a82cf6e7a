//! Blockfall: the falling-blocks header animation as a deterministic simulation.
//!
//! A [`BlockHeader`] owns a small occupancy grid sized to its host's width.
//! Blocks drop in on timers or clicks, fall a pixel per tick, settle, clear
//! full rows and reset the board when a column grows too tall. The host feeds
//! it geometry, pointer input and elapsed time, and draws what it exposes.

pub mod config;
pub mod event;
pub mod geometry;
pub mod gravity;
pub mod grid;
pub mod header;
pub mod line_clear;
pub mod overflow;
pub mod schedule;
pub mod spawner;
pub mod units;

pub use config::{ConfigError, HeaderConfig};
pub use event::{Event, SpawnSource};
pub use geometry::{GeometryProvider, HostRect, Metrics};
pub use grid::Grid;
pub use header::BlockHeader;
pub use spawner::{ColumnPicker, RandomColumns};
pub use units::{DisappearingUnit, FallingUnit, UnitId};
