//! State transitions reported to the host.

use crate::units::UnitId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSource {
    /// Header click.
    Pointer,
    /// Initial-delay or periodic timer.
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Column count changed; grid rebuilt and in-flight units abandoned.
    Resized { columns: usize },
    Spawned { id: UnitId, column: usize, source: SpawnSource },
    Landed { id: UnitId, column: usize, row: usize },
    /// Unit reached a column with no room and was discarded.
    Dropped { id: UnitId, column: usize },
    /// Full rows removed; `cascaded` blocks were lifted to fall again.
    LinesCleared { rows: Vec<usize>, cascaded: usize },
    /// A column exceeded the threshold and the board was reset.
    Overflowed { column: usize },
    VanishStarted { id: UnitId, column: usize, row: usize },
    /// Vanish finished: the cell is empty and `cascaded` blocks above it fall.
    Removed { id: UnitId, column: usize, row: usize, cascaded: usize },
    TornDown,
}
