//! BandLife engine internals and public API.

mod engine;
mod grid;
mod partition;
mod rules;
mod sync;

pub use engine::{BandLife, BandLifeConfig, SimError, step_band};
pub use grid::{Grid, NEIGHBOR_OFFSETS, wrap_index};
pub use partition::{RowBand, partition_rows};
pub use rules::next_state;
pub use sync::{BarrierBroken, TurnBarrier};
