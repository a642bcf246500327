//! Initial grid loading.
//!
//! A seed is a whitespace-separated list of integers: row count, column
//! count, number of live cells, then one `col row` pair per live cell.
//! Coordinates wrap around the torus once, so `-1` names the last
//! column or row. Anything after the declared pairs is ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use log::debug;
use thiserror::Error;

use crate::bandlife::Grid;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read seed file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed ended before the {field}")]
    Missing { field: &'static str },
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
    #[error("grid dimensions must be positive, got {rows} rows and {cols} columns")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("seed declares {declared} live cells but ends after {found}")]
    MissingCell { declared: usize, found: usize },
    #[error("live cell {index} has an invalid coordinate: {value:?}")]
    InvalidCell { index: usize, value: String },
    #[error("grid of {rows} rows and {cols} columns is too large to allocate")]
    TooLarge { rows: usize, cols: usize },
    #[error("live cell ({col}, {row}) is more than one grid dimension outside {cols}x{rows}")]
    CoordinateOutOfRange {
        col: i64,
        row: i64,
        cols: usize,
        rows: usize,
    },
}

/// Read and parse a seed file.
pub fn load_seed(path: impl AsRef<Path>) -> Result<Grid, SeedError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = parse_seed(&text)?;
    debug!(
        "loaded {}x{} seed with {} live cells from {}",
        grid.width(),
        grid.height(),
        grid.population(),
        path.display()
    );
    Ok(grid)
}

/// Parse seed text into a grid. No partial grid is produced on error.
pub fn parse_seed(text: &str) -> Result<Grid, SeedError> {
    let mut tokens = text.split_whitespace();
    let rows: usize = header_field(&mut tokens, "row count")?;
    let cols: usize = header_field(&mut tokens, "column count")?;
    let declared: usize = header_field(&mut tokens, "live cell count")?;
    if rows == 0 || cols == 0 {
        return Err(SeedError::EmptyGrid { rows, cols });
    }
    if !fits_in_memory(rows, cols) {
        return Err(SeedError::TooLarge { rows, cols });
    }

    let mut grid = Grid::new(cols, rows);
    for index in 0..declared {
        let col = coordinate(&mut tokens, index, declared)?;
        let row = coordinate(&mut tokens, index, declared)?;
        if !within_one_wrap(col, cols) || !within_one_wrap(row, rows) {
            return Err(SeedError::CoordinateOutOfRange {
                col,
                row,
                cols,
                rows,
            });
        }
        grid.set(col, row, true);
    }
    Ok(grid)
}

fn header_field<T: FromStr>(
    tokens: &mut SplitWhitespace<'_>,
    field: &'static str,
) -> Result<T, SeedError> {
    let token = tokens.next().ok_or(SeedError::Missing { field })?;
    token.parse().map_err(|_| SeedError::Invalid {
        field,
        value: token.to_string(),
    })
}

fn coordinate(
    tokens: &mut SplitWhitespace<'_>,
    index: usize,
    declared: usize,
) -> Result<i64, SeedError> {
    let token = tokens.next().ok_or(SeedError::MissingCell {
        declared,
        found: index,
    })?;
    token.parse().map_err(|_| SeedError::InvalidCell {
        index,
        value: token.to_string(),
    })
}

/// Cell indices are computed in `i64` and the buffer is one `Vec<bool>`.
fn fits_in_memory(rows: usize, cols: usize) -> bool {
    rows.checked_mul(cols)
        .is_some_and(|cells| i64::try_from(cells).is_ok() && cells <= isize::MAX as usize)
}

#[inline]
fn within_one_wrap(v: i64, dim: usize) -> bool {
    let dim = dim as i64;
    v >= -dim && v < dim.saturating_mul(2)
}
