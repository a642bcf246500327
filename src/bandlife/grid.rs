//! Flat toroidal cell storage.
//!
//! Cells are stored row-major, one `bool` per cell. Coordinates outside the
//! grid wrap around once: a column of `-1` means `width - 1` and a column of
//! `width` means `0`. Callers never step further than one grid dimension out.

use std::fmt;

use rand::Rng;

use super::partition::RowBand;

/// Moore neighborhood offsets, `(dx, dy)`, center excluded.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Translate a possibly out-of-range coordinate into a flat cell index.
///
/// Wrapping is a single step, not a modulo reduction: `col` must lie in
/// `[-width, 2 * width)` and `row` in `[-height, 2 * height)`.
#[inline(always)]
pub fn wrap_index(col: i64, row: i64, width: usize, height: usize) -> usize {
    let w = width as i64;
    let h = height as i64;

    let col = if col < 0 {
        col + w
    } else if col >= w {
        col - w
    } else {
        col
    };
    let row = if row < 0 {
        row + h
    } else if row >= h {
        row - h
    } else {
        row
    };
    debug_assert!(
        (0..w).contains(&col) && (0..h).contains(&row),
        "coordinate more than one grid dimension out of range"
    );

    (row * w + col) as usize
}

#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-dead grid.
    ///
    /// # Panics
    /// Panics if either dimension is zero or the cell count overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        let Some(len) = width.checked_mul(height) else {
            panic!("grid of {width}x{height} cells overflows usize");
        };
        Self {
            width,
            height,
            cells: vec![false; len],
        }
    }

    /// Create a grid with the given cells alive. Coordinates wrap once.
    pub fn with_live_cells<I>(width: usize, height: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut grid = Self::new(width, height);
        for (col, row) in cells {
            let idx = wrap_index(col, row, width, height);
            grid.cells[idx] = true;
        }
        grid
    }

    /// Fill a grid at random, each cell alive with probability `density`.
    pub fn random<R: Rng + ?Sized>(width: usize, height: usize, density: f64, rng: &mut R) -> Self {
        let mut grid = Self::new(width, height);
        for cell in &mut grid.cells {
            *cell = rng.random::<f64>() < density;
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    pub fn index(&self, col: i64, row: i64) -> usize {
        wrap_index(col, row, self.width, self.height)
    }

    #[inline]
    pub fn get(&self, col: i64, row: i64) -> bool {
        self.cells[self.index(col, row)]
    }

    #[inline]
    pub fn set(&mut self, col: i64, row: i64, alive: bool) {
        let idx = self.index(col, row);
        self.cells[idx] = alive;
    }

    /// Count live cells in the Moore neighborhood of `(col, row)`.
    ///
    /// On grids narrower or shorter than three cells several offsets wrap
    /// onto the same cell, and each offset is counted separately.
    #[inline]
    pub fn live_neighbors(&self, col: usize, row: usize) -> u8 {
        let (col, row) = (col as i64, row as i64);
        let mut count = 0u8;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if self.cells[wrap_index(col + dx, row + dy, self.width, self.height)] {
                count += 1;
            }
        }
        count
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().filter(|&&alive| alive).count() as u64
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        for (idx, _) in self.cells.iter().enumerate().filter(|(_, alive)| **alive) {
            f(idx % self.width, idx / self.width);
        }
    }

    /// Copy one band of rows from `rows` into this grid.
    ///
    /// `rows` holds exactly the cells of `band`, row-major.
    pub fn copy_band_from(&mut self, band: RowBand, rows: &[bool]) {
        let range = band.cell_range(self.width);
        self.cells[range].copy_from_slice(rows);
    }

    /// Split the cell buffer into one mutable slice per band.
    ///
    /// `bands` must be contiguous, in increasing row order, and cover every
    /// row exactly once (as produced by [`partition_rows`]). Empty bands
    /// receive empty slices.
    ///
    /// [`partition_rows`]: super::partition::partition_rows
    pub fn split_bands_mut(&mut self, bands: &[RowBand]) -> Vec<&mut [bool]> {
        let width = self.width;
        let mut rest: &mut [bool] = &mut self.cells;
        let mut slices = Vec::with_capacity(bands.len());
        for band in bands {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(band.row_count * width);
            slices.push(head);
            rest = tail;
        }
        debug_assert!(rest.is_empty(), "bands do not cover the grid");
        slices
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid {}x{}\n{}", self.width, self.height, self)
    }
}

/// Rows of `@` (alive) and `.` (dead), one line per row.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &alive in row {
                f.write_str(if alive { "@" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bandlife::partition::partition_rows;

    #[test]
    fn wrap_index_stays_in_range() {
        for (w, h) in [(1usize, 1usize), (3, 5), (8, 2), (17, 13)] {
            let (wi, hi) = (w as i64, h as i64);
            for row in -hi..2 * hi {
                for col in -wi..2 * wi {
                    assert!(wrap_index(col, row, w, h) < w * h, "({col},{row}) on {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn wrap_index_wraps_edges_once() {
        let (w, h) = (7, 4);
        assert_eq!(wrap_index(-1, 0, w, h), wrap_index(6, 0, w, h));
        assert_eq!(wrap_index(7, 0, w, h), wrap_index(0, 0, w, h));
        assert_eq!(wrap_index(0, -1, w, h), wrap_index(0, 3, w, h));
        assert_eq!(wrap_index(0, 4, w, h), 0);
        assert_eq!(wrap_index(-1, -1, w, h), w * h - 1);
        assert_eq!(wrap_index(3, 2, w, h), 2 * w + 3);
    }

    #[test]
    fn neighbors_exclude_center() {
        let mut grid = Grid::new(5, 5);
        grid.set(2, 2, true);
        assert_eq!(grid.live_neighbors(2, 2), 0);
        assert_eq!(grid.live_neighbors(1, 1), 1);
        assert_eq!(grid.live_neighbors(3, 3), 1);
        assert_eq!(grid.live_neighbors(0, 0), 0);
    }

    #[test]
    fn neighbors_wrap_across_corners() {
        let grid = Grid::with_live_cells(6, 6, [(0, 0)]);
        assert_eq!(grid.live_neighbors(5, 5), 1);
        assert_eq!(grid.live_neighbors(5, 0), 1);
        assert_eq!(grid.live_neighbors(0, 5), 1);
        assert_eq!(grid.live_neighbors(4, 4), 0);
    }

    #[test]
    fn full_grid_counts_eight() {
        let mut grid = Grid::new(4, 4);
        for row in 0..4 {
            for col in 0..4 {
                grid.set(col, row, true);
            }
        }
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(grid.live_neighbors(col, row), 8);
            }
        }
    }

    #[test]
    fn live_cells_wrap_on_construction() {
        let grid = Grid::with_live_cells(4, 3, [(-1, 0), (4, 3), (1, -3)]);
        assert!(grid.get(3, 0));
        assert!(grid.get(0, 0));
        assert!(grid.get(1, 0));
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn split_bands_matches_rows() {
        let mut grid = Grid::new(3, 5);
        let bands = partition_rows(5, 3);
        let slices = grid.split_bands_mut(&bands);
        let lens: Vec<usize> = slices.iter().map(|s| s.len()).collect();
        assert_eq!(lens, vec![6, 6, 3]);
    }

    #[test]
    fn split_bands_allows_empty_bands() {
        let mut grid = Grid::new(2, 2);
        let bands = partition_rows(2, 4);
        let mut slices = grid.split_bands_mut(&bands);
        assert_eq!(slices.len(), 4);
        assert!(slices[2].is_empty() && slices[3].is_empty());
        slices[1][0] = true;
        drop(slices);
        assert!(grid.get(0, 1));
    }

    #[test]
    fn display_uses_at_and_dot() {
        let grid = Grid::with_live_cells(3, 2, [(1, 0), (2, 1)]);
        assert_eq!(grid.to_string(), ".@.\n..@\n");
    }
}
