use std::io;
use std::sync::{Mutex, RwLock};
use std::thread;
use std::time::Duration;

use log::{debug, error, info};
use thiserror::Error;

use super::grid::Grid;
use super::partition::{RowBand, partition_rows};
use super::rules::next_state;
use super::sync::{AbortOnUnwind, BarrierBroken, TurnBarrier};
use crate::render::{FrameSink, NullSink};

const DEFAULT_THREAD_COUNT: usize = 2;
const DEFAULT_TURN_DELAY: Duration = Duration::from_millis(100);

/// Fatal failure of a simulation run.
///
/// After an error the grid contents are unspecified: some bands may have
/// advanced a generation further than others.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Barrier(#[from] BarrierBroken),
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
    #[error("shared grid lock poisoned")]
    Poisoned,
    #[error("failed to present generation {generation}: {source}")]
    Render {
        generation: u64,
        #[source]
        source: io::Error,
    },
}

impl SimError {
    /// A broken barrier only reports that some other worker failed first.
    fn is_secondary(&self) -> bool {
        matches!(self, SimError::Barrier(_))
    }
}

/// Configuration for a BandLife engine instance.
#[derive(Clone, Debug)]
pub struct BandLifeConfig {
    /// Number of worker threads, each owning one band of rows.
    pub thread_count: usize,
    /// Pause taken by the leader after presenting each frame in [`BandLife::run`].
    pub turn_delay: Duration,
}

impl Default for BandLifeConfig {
    fn default() -> Self {
        Self {
            thread_count: DEFAULT_THREAD_COUNT,
            turn_delay: DEFAULT_TURN_DELAY,
        }
    }
}

impl BandLifeConfig {
    /// Set the worker count. Values below one are raised to one.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = n.max(1);
        self
    }

    pub fn turn_delay(mut self, delay: Duration) -> Self {
        self.turn_delay = delay;
        self
    }
}

/// Game of Life on a torus, advanced by a fixed pool of banded workers.
pub struct BandLife {
    live: Grid,
    snapshot: Grid,
    generation: u64,
    bands: Vec<RowBand>,
    turn_delay: Duration,
}

impl BandLife {
    pub fn new(grid: Grid) -> Self {
        Self::with_config(grid, BandLifeConfig::default())
    }

    pub fn with_config(grid: Grid, config: BandLifeConfig) -> Self {
        let bands = partition_rows(grid.height(), config.thread_count.max(1));
        let snapshot = grid.clone();
        Self {
            live: grid,
            snapshot,
            generation: 0,
            bands,
            turn_delay: config.turn_delay,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.live
    }

    pub fn into_grid(self) -> Grid {
        self.live
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> u64 {
        self.live.population()
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[RowBand] {
        &self.bands
    }

    pub fn get_cell(&self, col: i64, row: i64) -> bool {
        self.live.get(col, row)
    }

    pub fn set_cell(&mut self, col: i64, row: i64, alive: bool) {
        self.live.set(col, row, alive);
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, f: F) {
        self.live.for_each_live(f);
    }

    pub fn step(&mut self) -> Result<(), SimError> {
        self.step_n(1)
    }

    /// Advance `turns` generations without presenting frames or pausing.
    pub fn step_n(&mut self, turns: u64) -> Result<(), SimError> {
        self.advance(turns, &mut NullSink, Duration::ZERO)
    }

    /// Advance `turns` generations, presenting each generation's snapshot to
    /// `sink` before it is computed and the final grid once afterwards.
    pub fn run<S>(&mut self, turns: u64, sink: &mut S) -> Result<(), SimError>
    where
        S: FrameSink + Send + ?Sized,
    {
        self.advance(turns, sink, self.turn_delay)?;
        let generation = self.generation;
        sink.present(&self.live, generation)
            .map_err(|source| SimError::Render { generation, source })
    }

    fn advance<S>(&mut self, turns: u64, sink: &mut S, delay: Duration) -> Result<(), SimError>
    where
        S: FrameSink + Send + ?Sized,
    {
        if turns == 0 {
            return Ok(());
        }

        let workers = self.bands.len();
        info!(
            "advancing {turns} generations of a {}x{} grid with {workers} workers",
            self.live.width(),
            self.live.height()
        );

        let shared = TurnShared {
            barrier: TurnBarrier::new(workers),
            live: self
                .live
                .split_bands_mut(&self.bands)
                .into_iter()
                .map(Mutex::new)
                .collect(),
            snapshot: RwLock::new(&mut self.snapshot),
            bands: &self.bands,
            first_generation: self.generation,
            turns,
            delay,
        };

        let outcome = thread::scope(|scope| {
            let mut leader_sink = Some(sink);
            let mut handles = Vec::with_capacity(workers);
            let mut failure = None;

            for worker in 0..workers {
                let sink = if worker == 0 { leader_sink.take() } else { None };
                let shared = &shared;
                let spawned = thread::Builder::new()
                    .name(format!("band-life-{worker}"))
                    .spawn_scoped(scope, move || shared.run_worker(worker, sink));
                match spawned {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(source) => {
                        error!("failed to spawn worker {worker}: {source}");
                        shared.barrier.abort();
                        failure = Some(SimError::Spawn { worker, source });
                        break;
                    }
                }
            }

            for (worker, handle) in handles {
                let outcome = handle
                    .join()
                    .unwrap_or(Err(SimError::WorkerPanicked { worker }));
                if let Err(err) = outcome {
                    let replace = match &failure {
                        None => true,
                        Some(current) => current.is_secondary() && !err.is_secondary(),
                    };
                    if replace {
                        failure = Some(err);
                    }
                }
            }

            failure.map_or(Ok(()), Err)
        });
        drop(shared);
        outcome?;

        self.generation += turns;
        info!(
            "reached generation {} with population {}",
            self.generation,
            self.live.population()
        );
        Ok(())
    }
}

/// State shared by every worker for one batch of turns.
///
/// Each worker writes only through its own entry in `live`. The leader
/// writes `snapshot` between barrier A and barrier B; everyone reads it
/// after barrier B. The locks are never contended, they only hand out the
/// access each phase already owns.
struct TurnShared<'g> {
    barrier: TurnBarrier,
    live: Vec<Mutex<&'g mut [bool]>>,
    snapshot: RwLock<&'g mut Grid>,
    bands: &'g [RowBand],
    first_generation: u64,
    turns: u64,
    delay: Duration,
}

impl TurnShared<'_> {
    fn run_worker<S>(&self, worker: usize, sink: Option<&mut S>) -> Result<(), SimError>
    where
        S: FrameSink + ?Sized,
    {
        let _unwind = AbortOnUnwind(&self.barrier);
        let result = self.turn_loop(worker, sink);
        if let Err(err) = &result {
            if !err.is_secondary() {
                error!("worker {worker} aborting run: {err}");
            }
            self.barrier.abort();
        }
        result
    }

    fn turn_loop<S>(&self, worker: usize, mut sink: Option<&mut S>) -> Result<(), SimError>
    where
        S: FrameSink + ?Sized,
    {
        let band = self.bands[worker];
        match band.end_row() {
            Some(end) => debug!(
                "worker {worker}: rows {}:{end} ({})",
                band.start_row, band.row_count
            ),
            None => debug!("worker {worker}: idle, no rows"),
        }

        for turn in 0..self.turns {
            let generation = self.first_generation + turn;

            self.barrier.wait()?;
            if let Some(sink) = sink.as_deref_mut() {
                self.publish_snapshot(sink, generation)?;
            }
            self.barrier.wait()?;

            self.compute_band(band, worker)?;
        }
        Ok(())
    }

    /// Leader only: copy every band into the snapshot and present it.
    fn publish_snapshot<S>(&self, sink: &mut S, generation: u64) -> Result<(), SimError>
    where
        S: FrameSink + ?Sized,
    {
        let mut snapshot = self.snapshot.write().map_err(|_| SimError::Poisoned)?;
        for (band, rows) in self.bands.iter().zip(&self.live) {
            let rows = rows.lock().map_err(|_| SimError::Poisoned)?;
            snapshot.copy_band_from(*band, &rows[..]);
        }
        sink.present(&snapshot, generation)
            .map_err(|source| SimError::Render { generation, source })?;
        drop(snapshot);
        debug!("generation {generation} published");

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(())
    }

    fn compute_band(&self, band: RowBand, worker: usize) -> Result<(), SimError> {
        if band.is_empty() {
            return Ok(());
        }
        let snapshot = self.snapshot.read().map_err(|_| SimError::Poisoned)?;
        let mut rows = self.live[worker].lock().map_err(|_| SimError::Poisoned)?;
        step_band(&snapshot, band, &mut rows[..]);
        Ok(())
    }
}

/// Apply the rule to every cell of `band`, reading `snapshot` and writing
/// `out`, which holds exactly the band's cells.
pub fn step_band(snapshot: &Grid, band: RowBand, out: &mut [bool]) {
    let width = snapshot.width();
    debug_assert_eq!(out.len(), band.row_count * width);

    let cells = snapshot.cells();
    for (row, out_row) in band.rows().zip(out.chunks_mut(width)) {
        let row_start = row * width;
        for (col, cell) in out_row.iter_mut().enumerate() {
            *cell = next_state(cells[row_start + col], snapshot.live_neighbors(col, row));
        }
    }
}
