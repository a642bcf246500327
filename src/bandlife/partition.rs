//! Row partitioning across workers.

use std::ops::Range;

/// A contiguous run of rows owned by one worker.
///
/// A band with `row_count == 0` is idle: its inclusive end row lies before
/// its start row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowBand {
    pub start_row: usize,
    pub row_count: usize,
}

impl RowBand {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Last row of the band, inclusive. `None` for an idle band.
    #[inline]
    pub fn end_row(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.start_row + self.row_count - 1)
        }
    }

    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.start_row + self.row_count
    }

    /// Flat cell range covered by this band on a grid of `width` columns.
    #[inline]
    pub fn cell_range(&self, width: usize) -> Range<usize> {
        self.start_row * width..(self.start_row + self.row_count) * width
    }
}

/// Split `height` rows into `workers` contiguous bands.
///
/// The first `height % workers` bands get one extra row. With more workers
/// than rows the trailing bands are empty and start at `height`.
pub fn partition_rows(height: usize, workers: usize) -> Vec<RowBand> {
    assert!(workers > 0, "at least one worker is required");
    let base = height / workers;
    let remainder = height % workers;

    let mut next = 0;
    (0..workers)
        .map(|worker| {
            let row_count = if worker < remainder { base + 1 } else { base };
            let band = RowBand {
                start_row: next,
                row_count,
            };
            next += row_count;
            band
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_rows_exactly_once() {
        for height in 1..=40 {
            for workers in 1..=12 {
                let bands = partition_rows(height, workers);
                assert_eq!(bands.len(), workers);

                let mut covered = vec![0u8; height];
                for band in &bands {
                    for row in band.rows() {
                        covered[row] += 1;
                    }
                }
                assert!(
                    covered.iter().all(|&n| n == 1),
                    "height {height} workers {workers}: {bands:?}"
                );

                let sizes: Vec<usize> = bands.iter().map(|b| b.row_count).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1);
                assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "larger bands first");
            }
        }
    }

    #[test]
    fn remainder_goes_to_low_workers() {
        let bands = partition_rows(10, 4);
        let spans: Vec<(usize, Option<usize>)> =
            bands.iter().map(|b| (b.start_row, b.end_row())).collect();
        assert_eq!(
            spans,
            vec![(0, Some(2)), (3, Some(5)), (6, Some(7)), (8, Some(9))]
        );
    }

    #[test]
    fn extra_workers_get_idle_bands() {
        let bands = partition_rows(3, 5);
        assert_eq!(bands[2].rows(), 2..3);
        assert!(bands[3].is_empty() && bands[4].is_empty());
        assert_eq!(bands[3].end_row(), None);
        assert_eq!(bands[4].start_row, 3);
        assert!(bands[4].rows().is_empty());
    }

    #[test]
    fn cell_range_scales_by_width() {
        let band = RowBand {
            start_row: 2,
            row_count: 3,
        };
        assert_eq!(band.cell_range(4), 8..20);
    }
}
