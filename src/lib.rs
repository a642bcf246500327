//! Banded multi-threaded Conway's Game of Life (B3/S23) on a torus.

pub mod bandlife;
pub mod render;
pub mod seed;
pub use bandlife::{BandLife, BandLifeConfig, Grid, RowBand, SimError};
pub use render::{FrameSink, NullSink, TerminalSink, TextSink};
pub use seed::{SeedError, load_seed, parse_seed};
