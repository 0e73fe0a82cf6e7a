//! Full-row clearing and the cascade that lifts blocks back into the air.

use crate::grid::Grid;

/// A settled block taken out of the grid so it can fall again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cascade {
    pub column: usize,
    /// Row it occupied before being lifted.
    pub from_row: usize,
    /// Cleared rows strictly below it: how far, in rows, it has to fall to close the gap.
    pub rows_cleared_below: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearReport {
    /// Cleared rows, floor first.
    pub rows: Vec<usize>,
    pub cascades: Vec<Cascade>,
}

/// Clears every full row in a single pass, then lifts each block that had a
/// cleared row beneath it. Returns `None` when no row was full.
///
/// Cascades are listed column by column, top row first.
pub fn scan_and_clear(grid: &mut Grid) -> Option<ClearReport> {
    let rows = grid.full_rows();
    if rows.is_empty() {
        return None;
    }
    for &row in &rows {
        grid.clear_row(row);
    }

    let mut cascades = Vec::new();
    for column in 0..grid.columns() {
        for row in (0..grid.rows()).rev() {
            if !grid.is_occupied(column, row) {
                continue;
            }
            let rows_cleared_below = rows.iter().filter(|&&cleared| cleared < row).count();
            if rows_cleared_below > 0 {
                grid.set(column, row, false);
                cascades.push(Cascade {
                    column,
                    from_row: row,
                    rows_cleared_below,
                });
            }
        }
    }

    Some(ClearReport { rows, cascades })
}

/// Empties `(column, row)` and lifts every block above it in that column,
/// lowest first. Each lifted block has one row (the emptied one) to fall.
pub fn lift_above(grid: &mut Grid, column: usize, row: usize) -> Vec<Cascade> {
    grid.set(column, row, false);
    let mut cascades = Vec::new();
    for above in row + 1..grid.rows() {
        if grid.is_occupied(column, above) {
            grid.set(column, above, false);
            cascades.push(Cascade {
                column,
                from_row: above,
                rows_cleared_below: 1,
            });
        }
    }
    cascades
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(grid: &mut Grid, row: usize) {
        for x in 0..grid.columns() {
            grid.set(x, row, true);
        }
    }

    #[test]
    fn nothing_to_clear() {
        let mut grid = Grid::new(3, 4);
        grid.set(0, 0, true);
        let before = grid.clone();
        assert_eq!(scan_and_clear(&mut grid), None);
        assert_eq!(grid, before);
    }

    #[test]
    fn clears_the_floor_and_keeps_lower_blocks() {
        let mut grid = Grid::new(2, 4);
        fill_row(&mut grid, 1);
        grid.set(0, 0, true);
        let report = scan_and_clear(&mut grid).expect("row 1 is full");
        assert_eq!(report.rows, vec![1]);
        assert!(report.cascades.is_empty());
        assert!(grid.is_occupied(0, 0));
        assert!(grid.full_rows().is_empty());
    }

    #[test]
    fn clears_separated_rows_in_one_pass() {
        let mut grid = Grid::new(3, 4);
        fill_row(&mut grid, 0);
        fill_row(&mut grid, 2);
        grid.set(1, 1, true);
        grid.set(2, 3, true);

        let report = scan_and_clear(&mut grid).expect("two full rows");
        assert_eq!(report.rows, vec![0, 2]);
        assert_eq!(
            report.cascades,
            vec![
                Cascade { column: 1, from_row: 1, rows_cleared_below: 1 },
                Cascade { column: 2, from_row: 3, rows_cleared_below: 2 },
            ]
        );
        assert!(grid.is_empty());
    }

    #[test]
    fn lift_above_takes_the_whole_column_segment() {
        let mut grid = Grid::new(2, 4);
        for y in 0..4 {
            grid.set(0, y, true);
        }
        grid.set(1, 2, true);
        let cascades = lift_above(&mut grid, 0, 1);
        let rows: Vec<usize> = cascades.iter().map(|c| c.from_row).collect();
        assert_eq!(rows, vec![2, 3]);
        assert!(grid.is_occupied(0, 0));
        assert!(!grid.is_occupied(0, 1) && !grid.is_occupied(0, 2) && !grid.is_occupied(0, 3));
        assert!(grid.is_occupied(1, 2));
    }
}
