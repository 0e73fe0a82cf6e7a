//! One gravity step: every falling unit moves down a pixel or lands.

use crate::geometry::Metrics;
use crate::grid::Grid;
use crate::units::{FallingUnit, UnitId};

/// What happened to a single unit during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Still in the air at the new `y`.
    Falling(f64),
    /// Reached the top of the stack (or the floor) in its column.
    Landed { row: usize },
    /// Its column has no room (or no longer exists); the unit vanishes.
    Dropped,
}

/// Decides one unit's fate against the settled grid only.
pub fn step_unit(unit: &FallingUnit, grid: &Grid, metrics: &Metrics) -> Step {
    let next_pixel_y = unit.y * metrics.unit_size + 1.0;

    // Still above the header: no collision until it enters.
    if next_pixel_y < 0.0 {
        return Step::Falling(next_pixel_y / metrics.unit_size);
    }

    let Some(row) = grid.bottom_empty_row(unit.column) else {
        return Step::Dropped;
    };

    if next_pixel_y >= metrics.row_to_pixel_y(row) {
        Step::Landed { row }
    } else {
        Step::Falling(next_pixel_y / metrics.unit_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub id: UnitId,
    pub column: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discard {
    pub id: UnitId,
    pub column: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub landed: Vec<Landing>,
    pub dropped: Vec<Discard>,
}

/// Advances every unit in order. Landings are written to `grid` as they happen,
/// so a later unit in the same column sees the cell an earlier one just took.
pub fn step_all(falling: &mut Vec<FallingUnit>, grid: &mut Grid, metrics: &Metrics) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    falling.retain_mut(|unit| match step_unit(unit, grid, metrics) {
        Step::Falling(y) => {
            unit.y = y;
            true
        }
        Step::Landed { row } => {
            grid.set(unit.column, row, true);
            outcome.landed.push(Landing {
                id: unit.id,
                column: unit.column,
                row,
            });
            false
        }
        Step::Dropped => {
            outcome.dropped.push(Discard {
                id: unit.id,
                column: unit.column,
            });
            false
        }
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{IdAllocator, SPAWN_Y};

    fn unit(ids: &mut IdAllocator, column: usize, y: f64) -> FallingUnit {
        FallingUnit {
            id: ids.next(),
            column,
            y,
        }
    }

    #[test]
    fn moves_one_pixel_per_step() {
        let mut ids = IdAllocator::default();
        let metrics = Metrics::new(16.0);
        let grid = Grid::new(4, 4);
        let u = unit(&mut ids, 1, SPAWN_Y);
        assert_eq!(step_unit(&u, &grid, &metrics), Step::Falling(-31.0 / 16.0));
    }

    #[test]
    fn above_the_header_ignores_a_full_column() {
        let mut ids = IdAllocator::default();
        let metrics = Metrics::new(16.0);
        let mut grid = Grid::new(1, 4);
        for y in 0..4 {
            grid.set(0, y, true);
        }
        let high = unit(&mut ids, 0, -1.0);
        assert!(matches!(step_unit(&high, &grid, &metrics), Step::Falling(_)));
        let entering = unit(&mut ids, 0, -1.0 / 16.0);
        assert_eq!(step_unit(&entering, &grid, &metrics), Step::Dropped);
    }

    #[test]
    fn lands_on_top_of_the_stack() {
        let mut ids = IdAllocator::default();
        let metrics = Metrics::new(16.0);
        let mut grid = Grid::new(2, 4);
        grid.set(0, 0, true);
        // Row 1 top edge is at 32 px; one pixel short keeps falling.
        let close = unit(&mut ids, 0, 30.0 / 16.0);
        assert_eq!(step_unit(&close, &grid, &metrics), Step::Falling(31.0 / 16.0));
        let touching = unit(&mut ids, 0, 31.0 / 16.0);
        assert_eq!(step_unit(&touching, &grid, &metrics), Step::Landed { row: 1 });
    }

    #[test]
    fn same_tick_landings_stack_up() {
        let mut ids = IdAllocator::default();
        let metrics = Metrics::new(16.0);
        let mut grid = Grid::new(1, 4);
        let mut falling = vec![unit(&mut ids, 0, 47.0 / 16.0), unit(&mut ids, 0, 40.0 / 16.0)];
        let outcome = step_all(&mut falling, &mut grid, &metrics);
        assert!(falling.is_empty());
        let rows: Vec<usize> = outcome.landed.iter().map(|l| l.row).collect();
        assert_eq!(rows, vec![0, 1]);
        assert!(grid.is_occupied(0, 0) && grid.is_occupied(0, 1));
    }

    #[test]
    fn units_in_missing_columns_are_dropped() {
        let mut ids = IdAllocator::default();
        let metrics = Metrics::new(16.0);
        let mut grid = Grid::new(2, 4);
        let mut falling = vec![unit(&mut ids, 5, 0.0)];
        let outcome = step_all(&mut falling, &mut grid, &metrics);
        assert_eq!(outcome.dropped.len(), 1);
        assert!(falling.is_empty());
        assert!(grid.is_empty());
    }
}
