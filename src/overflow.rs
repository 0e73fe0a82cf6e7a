//! Stack-height watchdog.

use crate::grid::Grid;

/// First column holding more than `max_stack` blocks, if any.
pub fn overflowing_column(grid: &Grid, max_stack: usize) -> Option<usize> {
    (0..grid.columns()).find(|&x| grid.stack_height(x) > max_stack)
}
