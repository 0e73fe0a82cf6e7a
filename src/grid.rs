//! Settled blocks: a column-major occupancy matrix. Row 0 is the floor.

/// `columns × rows` occupancy. `cells[x][y]` is true when a settled block sits there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<Vec<bool>>,
}

impl Grid {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![vec![false; rows]; columns],
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Out-of-range coordinates read as empty.
    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(x)
            .and_then(|column| column.get(y))
            .copied()
            .unwrap_or(false)
    }

    /// Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, occupied: bool) {
        if let Some(cell) = self.cells.get_mut(x).and_then(|column| column.get_mut(y)) {
            *cell = occupied;
        }
    }

    /// Lowest empty row of column `x`; `None` if the column is full or does not exist.
    pub fn bottom_empty_row(&self, x: usize) -> Option<usize> {
        let column = self.cells.get(x)?;
        column.iter().position(|occupied| !occupied)
    }

    /// Occupied cells in column `x` (not necessarily contiguous).
    pub fn stack_height(&self, x: usize) -> usize {
        self.cells
            .get(x)
            .map(|column| column.iter().filter(|&&occupied| occupied).count())
            .unwrap_or(0)
    }

    /// True when every column is occupied at `y`. A grid without columns has no full rows.
    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.rows && self.columns > 0 && self.cells.iter().all(|column| column[y])
    }

    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.rows).filter(|&y| self.is_row_full(y)).collect()
    }

    pub fn clear_row(&mut self, y: usize) {
        for column in &mut self.cells {
            if let Some(cell) = column.get_mut(y) {
                *cell = false;
            }
        }
    }

    /// Empties every cell, keeping the dimensions.
    pub fn clear(&mut self) {
        *self = Self::new(self.columns, self.rows);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|&occupied| !occupied)
    }

    /// `(x, y)` of every settled block, column by column, floor first.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, column)| {
            column
                .iter()
                .enumerate()
                .filter(|(_, occupied)| **occupied)
                .map(move |(y, _)| (x, y))
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_empty_row_skips_settled_cells() {
        let mut grid = Grid::new(3, 4);
        assert_eq!(grid.bottom_empty_row(1), Some(0));
        grid.set(1, 0, true);
        grid.set(1, 1, true);
        assert_eq!(grid.bottom_empty_row(1), Some(2));
        grid.set(1, 2, true);
        grid.set(1, 3, true);
        assert_eq!(grid.bottom_empty_row(1), None);
        assert_eq!(grid.bottom_empty_row(7), None);
    }

    #[test]
    fn out_of_range_access_is_ignored() {
        let mut grid = Grid::new(2, 4);
        grid.set(2, 0, true);
        grid.set(0, 4, true);
        assert!(grid.is_empty());
        assert!(!grid.is_occupied(5, 5));
        assert_eq!(grid.stack_height(9), 0);
    }

    #[test]
    fn full_rows_need_every_column() {
        let mut grid = Grid::new(3, 4);
        for x in 0..3 {
            grid.set(x, 1, true);
        }
        grid.set(0, 2, true);
        grid.set(1, 2, true);
        assert_eq!(grid.full_rows(), vec![1]);
        assert!(!Grid::new(0, 4).is_row_full(0));
    }

    #[test]
    fn occupied_cells_reports_coordinates() {
        let mut grid = Grid::new(3, 4);
        grid.set(2, 3, true);
        grid.set(0, 0, true);
        assert_eq!(grid.occupied_cells().collect::<Vec<_>>(), vec![(0, 0), (2, 3)]);
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!((grid.columns(), grid.rows()), (3, 4));
    }
}
