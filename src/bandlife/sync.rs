//! Reusable rendezvous for the turn protocol.
//!
//! Unlike `std::sync::Barrier`, a `TurnBarrier` can be broken: once any
//! participant calls [`TurnBarrier::abort`], every current and future waiter
//! returns [`BarrierBroken`] instead of blocking forever on a peer that will
//! never arrive.

use std::sync::{Condvar, Mutex};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("turn barrier broken by a failed worker")]
pub struct BarrierBroken;

struct BarrierState {
    arrived: usize,
    phase: u64,
    broken: bool,
}

pub struct TurnBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl TurnBarrier {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "barrier needs at least one participant");
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                phase: 0,
                broken: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Block until all participants have arrived for the current phase.
    pub fn wait(&self) -> Result<(), BarrierBroken> {
        let mut state = self.state.lock().map_err(|_| BarrierBroken)?;
        if state.broken {
            return Err(BarrierBroken);
        }

        let phase = state.phase;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.phase = state.phase.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(());
        }

        let state = self
            .cvar
            .wait_while(state, |s| s.phase == phase && !s.broken)
            .map_err(|_| BarrierBroken)?;
        if state.phase == phase {
            Err(BarrierBroken)
        } else {
            Ok(())
        }
    }

    /// Break the barrier and wake every waiter. Idempotent.
    pub fn abort(&self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.broken = true;
        self.cvar.notify_all();
    }

    pub fn is_broken(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.broken,
            Err(_) => true,
        }
    }
}

/// Breaks the barrier if dropped while its thread is panicking.
pub struct AbortOnUnwind<'a>(pub &'a TurnBarrier);

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.abort();
        }
    }
}
