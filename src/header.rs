//! Header animation state: grid, falling and disappearing units, timers.
//!
//! Everything runs on a virtual clock advanced by the host. Each timer firing
//! is handled to completion before the next one is looked at, so a landing,
//! the overflow check and the line clear it triggers form one transition.

use crate::config::{ConfigError, HeaderConfig};
use crate::event::{Event, SpawnSource};
use crate::geometry::{self, GeometryProvider, Metrics};
use crate::gravity;
use crate::grid::Grid;
use crate::line_clear::{self, Cascade};
use crate::overflow;
use crate::schedule::Timer;
use crate::spawner::{ColumnPicker, SpawnTimer, Spawner};
use crate::units::{DisappearingUnit, FallingUnit, IdAllocator, SPAWN_Y, UnitId};
use log::{debug, info};
use std::time::Duration;

/// Timer kinds in tie-break order: at equal deadlines the earlier variant runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Due {
    Vanish,
    Gravity,
    Spawn(SpawnOrder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SpawnOrder {
    Initial,
    Periodic,
}

impl From<SpawnTimer> for SpawnOrder {
    fn from(timer: SpawnTimer) -> Self {
        match timer {
            SpawnTimer::Initial => Self::Initial,
            SpawnTimer::Periodic => Self::Periodic,
        }
    }
}

impl From<SpawnOrder> for SpawnTimer {
    fn from(order: SpawnOrder) -> Self {
        match order {
            SpawnOrder::Initial => Self::Initial,
            SpawnOrder::Periodic => Self::Periodic,
        }
    }
}

/// The header simulation. The host mounts it, forwards input and elapsed
/// time, and drains [`Event`]s from it regularly.
#[derive(Debug)]
pub struct BlockHeader {
    config: HeaderConfig,
    metrics: Metrics,
    grid: Grid,
    falling: Vec<FallingUnit>,
    disappearing: Vec<DisappearingUnit>,
    ids: IdAllocator,
    spawner: Spawner,
    gravity: Timer,
    now: Duration,
    mounted: bool,
    events: Vec<Event>,
}

impl BlockHeader {
    /// Unmounted simulation with no columns. Nothing moves until [`Self::mount`].
    pub fn new(config: HeaderConfig, picker: impl ColumnPicker + 'static) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawner = Spawner::new(Box::new(picker), config.spawn_delay, config.spawn_interval);
        Ok(Self {
            metrics: Metrics::new(config.unit_size),
            grid: Grid::new(0, config.rows),
            falling: Vec::new(),
            disappearing: Vec::new(),
            ids: IdAllocator::default(),
            spawner,
            gravity: Timer::idle(),
            now: Duration::ZERO,
            mounted: false,
            events: Vec::new(),
            config,
        })
    }

    /// Starts the simulation on `host`. Mounting after [`Self::teardown`] starts
    /// over with an empty grid and fresh timers, even on a host of the same size.
    pub fn mount(&mut self, host: &impl GeometryProvider) {
        if !self.mounted {
            self.mounted = true;
            self.grid = Grid::new(0, self.config.rows);
            self.falling.clear();
            self.disappearing.clear();
        }
        self.sync_geometry(host);
    }

    /// Cancels every timer and stops reacting to input and time.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.spawner.cancel();
        self.gravity.cancel();
        self.disappearing.clear();
        info!("header animation torn down at {:?}", self.now);
        self.events.push(Event::TornDown);
    }

    /// Reads the host size through the port. An unmeasurable host changes nothing.
    pub fn sync_geometry(&mut self, host: &impl GeometryProvider) {
        let Some(rect) = host.measure() else {
            debug!("host not measurable, keeping {} columns", self.grid.columns());
            return;
        };
        self.set_header_height(rect.height);
        self.resize(rect.width);
    }

    pub fn set_header_height(&mut self, height: f64) {
        if height.is_finite() && height > 0.0 {
            self.metrics.header_height = height;
        }
    }

    /// Rebuilds the grid when the column count changes. Returns whether it did.
    pub fn resize(&mut self, width: f64) -> bool {
        if !self.mounted {
            return false;
        }
        let columns = self.metrics.columns_for_width(width);
        if columns == self.grid.columns() {
            return false;
        }

        self.grid = Grid::new(columns, self.config.rows);
        let abandoned = self.falling.len() + self.disappearing.len();
        self.falling.clear();
        self.disappearing.clear();

        if columns == 0 {
            self.spawner.cancel();
            self.gravity.cancel();
        } else {
            self.spawner.arm(self.now);
            if !self.gravity.is_armed() {
                self.gravity = Timer::every(self.now, self.config.tick_interval);
            }
        }

        info!("header resized to {columns} columns ({width}px), abandoned {abandoned} units");
        self.events.push(Event::Resized { columns });
        true
    }

    /// Column under a pointer offset, clamped into the grid (0 when there is none).
    pub fn column_from_pixel_x(&self, pixel_x: f64) -> usize {
        geometry::column_from_pixel_x(pixel_x, self.metrics.unit_size, self.grid.columns())
    }

    /// Drops a block into `column`, clamped into the grid.
    pub fn spawn_at(&mut self, column: usize) -> Option<UnitId> {
        self.spawn(column, SpawnSource::Pointer)
    }

    /// Header click at a horizontal pixel offset.
    pub fn click(&mut self, pixel_x: f64) -> Option<UnitId> {
        let column = self.column_from_pixel_x(pixel_x);
        self.spawn_at(column)
    }

    /// Starts the vanish animation of a settled block. The grid changes only when it ends.
    pub fn remove_at(&mut self, column: usize, row: usize) -> Option<UnitId> {
        if !self.mounted || !self.grid.is_occupied(column, row) {
            return None;
        }
        if self
            .disappearing
            .iter()
            .any(|unit| unit.column == column && unit.row == row)
        {
            return None;
        }
        let id = self.ids.next();
        self.disappearing.push(DisappearingUnit {
            id,
            column,
            row,
            y: self.metrics.row_to_unit_y(row),
            started_at: self.now,
            expires_at: self.now.saturating_add(self.config.vanish_duration),
        });
        debug!("block ({column}, {row}) vanishing as {id:?}");
        self.events.push(Event::VanishStarted { id, column, row });
        Some(id)
    }

    /// Moves the clock forward, firing every due timer in deadline order.
    pub fn advance(&mut self, dt: Duration) {
        if !self.mounted {
            return;
        }
        let target = self.now.saturating_add(dt);
        while let Some((deadline, due)) = self.next_due(target) {
            self.now = deadline;
            match due {
                Due::Vanish => self.finish_vanished(),
                Due::Gravity => {
                    if self.gravity.fire(deadline) {
                        self.gravity_tick();
                    }
                }
                Due::Spawn(order) => {
                    if self.spawner.fire(order.into(), deadline) {
                        self.scheduled_spawn();
                    }
                }
            }
            if !self.mounted {
                return;
            }
        }
        self.now = target;
    }

    /// Takes the events produced since the last call.
    ///
    /// Events queue up until drained, so a host should call this once per
    /// frame (or after each batch of input) even if it ignores them.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn falling(&self) -> &[FallingUnit] {
        &self.falling
    }

    pub fn disappearing(&self) -> &[DisappearingUnit] {
        &self.disappearing
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn config(&self) -> &HeaderConfig {
        &self.config
    }

    /// Virtual time since construction.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// When the next autonomous drop happens, if one is scheduled.
    pub fn next_spawn_at(&self) -> Option<Duration> {
        self.spawner.next_deadline().map(|(deadline, _)| deadline)
    }

    fn next_due(&self, limit: Duration) -> Option<(Duration, Due)> {
        let vanish = self
            .disappearing
            .iter()
            .map(|unit| unit.expires_at)
            .min()
            .map(|deadline| (deadline, Due::Vanish));
        let gravity = self.gravity.deadline().map(|deadline| (deadline, Due::Gravity));
        let spawn = self
            .spawner
            .next_deadline()
            .map(|(deadline, timer)| (deadline, Due::Spawn(timer.into())));

        [vanish, gravity, spawn]
            .into_iter()
            .flatten()
            .filter(|(deadline, _)| *deadline <= limit)
            .min()
    }

    fn spawn(&mut self, column: usize, source: SpawnSource) -> Option<UnitId> {
        let columns = self.grid.columns();
        if !self.mounted || columns == 0 {
            return None;
        }
        let column = column.min(columns - 1);
        let id = self.ids.next();
        self.falling.push(FallingUnit {
            id,
            column,
            y: SPAWN_Y,
        });
        debug!("spawned {id:?} in column {column} ({source:?})");
        self.events.push(Event::Spawned { id, column, source });
        Some(id)
    }

    fn scheduled_spawn(&mut self) {
        if let Some(column) = self.spawner.pick_column(self.grid.columns()) {
            self.spawn(column, SpawnSource::Scheduled);
        }
    }

    fn gravity_tick(&mut self) {
        let outcome = gravity::step_all(&mut self.falling, &mut self.grid, &self.metrics);
        for landing in &outcome.landed {
            debug!("{:?} landed at ({}, {})", landing.id, landing.column, landing.row);
            self.events.push(Event::Landed {
                id: landing.id,
                column: landing.column,
                row: landing.row,
            });
        }
        for discard in &outcome.dropped {
            debug!("{:?} dropped, column {} has no room", discard.id, discard.column);
            self.events.push(Event::Dropped {
                id: discard.id,
                column: discard.column,
            });
        }
        if outcome.landed.is_empty() {
            return;
        }
        if self.guard_overflow() {
            return;
        }
        self.clear_lines();
    }

    fn clear_lines(&mut self) {
        let Some(report) = line_clear::scan_and_clear(&mut self.grid) else {
            return;
        };
        info!(
            "cleared rows {:?}, {} blocks fall again",
            report.rows,
            report.cascades.len()
        );
        self.relaunch(&report.cascades);
        self.events.push(Event::LinesCleared {
            cascaded: report.cascades.len(),
            rows: report.rows,
        });
        self.guard_overflow();
    }

    fn finish_vanished(&mut self) {
        let now = self.now;
        let mut expired: Vec<DisappearingUnit> = Vec::new();
        self.disappearing.retain(|unit| {
            if unit.expires_at <= now {
                expired.push(*unit);
                false
            } else {
                true
            }
        });
        expired.sort_by_key(|unit| (unit.expires_at, unit.id));

        for unit in expired {
            let cascades = line_clear::lift_above(&mut self.grid, unit.column, unit.row);
            self.relaunch(&cascades);
            debug!(
                "block ({}, {}) removed, {} above it fall",
                unit.column,
                unit.row,
                cascades.len()
            );
            self.events.push(Event::Removed {
                id: unit.id,
                column: unit.column,
                row: unit.row,
                cascaded: cascades.len(),
            });
            self.guard_overflow();
        }
    }

    /// Turns lifted blocks into falling units at their current height.
    fn relaunch(&mut self, cascades: &[Cascade]) {
        for cascade in cascades {
            let id = self.ids.next();
            self.falling.push(FallingUnit {
                id,
                column: cascade.column,
                y: self.metrics.row_to_unit_y(cascade.from_row),
            });
        }
    }

    /// Full reset when any column is too tall. Returns whether it fired.
    fn guard_overflow(&mut self) -> bool {
        let Some(column) = overflow::overflowing_column(&self.grid, self.config.max_stack) else {
            return false;
        };
        info!(
            "column {column} exceeded {} blocks, resetting the board",
            self.config.max_stack
        );
        self.grid.clear();
        self.falling.clear();
        self.events.push(Event::Overflowed { column });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HostRect;

    struct First;

    impl ColumnPicker for First {
        fn pick(&mut self, _columns: usize) -> usize {
            0
        }
    }

    fn mounted(width: f64) -> BlockHeader {
        let mut header = BlockHeader::new(HeaderConfig::default(), First).expect("valid config");
        header.mount(&HostRect::new(width, 64.0));
        header
    }

    #[test]
    fn tie_break_prefers_vanish_then_gravity() {
        assert!(Due::Vanish < Due::Gravity);
        assert!(Due::Gravity < Due::Spawn(SpawnOrder::Initial));
        assert!(Due::Spawn(SpawnOrder::Initial) < Due::Spawn(SpawnOrder::Periodic));
    }

    #[test]
    fn unmounted_header_ignores_everything() {
        let mut header = BlockHeader::new(HeaderConfig::default(), First).expect("valid config");
        assert!(!header.resize(320.0));
        assert_eq!(header.spawn_at(0), None);
        header.advance(Duration::from_secs(60));
        assert_eq!(header.now(), Duration::ZERO);
        assert_eq!(header.drain_events().count(), 0);
    }

    #[test]
    fn zero_width_disarms_timers() {
        let mut header = mounted(160.0);
        assert!(header.next_spawn_at().is_some());
        assert!(header.resize(0.0));
        assert_eq!(header.columns(), 0);
        assert_eq!(header.next_spawn_at(), None);
        assert_eq!(header.spawn_at(3), None);
        header.advance(Duration::from_secs(100));
        assert!(header.falling().is_empty());
    }

    #[test]
    fn remount_after_teardown_rearms_timers() {
        let mut header = mounted(64.0);
        header.spawn_at(1);
        header.advance(Duration::from_millis(330));
        header.teardown();
        assert_eq!(header.next_spawn_at(), None);

        header.mount(&HostRect::new(64.0, 64.0));
        assert!(header.falling().is_empty());
        assert!(header.gravity.is_armed());
        assert_eq!(
            header.next_spawn_at(),
            Some(header.now() + HeaderConfig::default().spawn_delay)
        );
    }

    #[test]
    fn relaunched_blocks_start_at_their_cell() {
        let mut header = mounted(32.0);
        header.grid.set(1, 2, true);
        header.relaunch(&[Cascade {
            column: 1,
            from_row: 2,
            rows_cleared_below: 1,
        }]);
        assert_eq!(header.falling()[0].y, 1.0);
    }
}
