//==============================================================================
// Interpreter lock emulation
//==============================================================================
//
// Rust threads run CPU work in parallel out of the box. To reproduce the
// behavior of an interpreter with a global lock, CPU-bound work holds this
// mutex while it computes and hands it back every `switch_interval`
// candidates. Blocking waits never take it.

use clap::ValueEnum;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of prime candidates examined per lock acquisition.
pub const DEFAULT_SWITCH_INTERVAL: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LockMode {
    /// One thread computes at a time, like an interpreter with a GIL.
    Global,
    /// No serialization; threads compute in parallel.
    Free,
}

impl LockMode {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            LockMode::Global
        } else {
            LockMode::Free
        }
    }

    /// Command-line spelling, as accepted by `--lock`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::Global => "global",
            LockMode::Free => "free",
        }
    }
}

/// Per-process lock. Every worker process builds its own, so processes
/// never contend with each other.
#[derive(Debug)]
pub struct InterpreterLock {
    mode: LockMode,
    switch_interval: u64,
    mutex: Mutex<()>,
}

impl InterpreterLock {
    pub fn new(mode: LockMode, switch_interval: u64) -> Self {
        InterpreterLock {
            mode,
            switch_interval: switch_interval.max(1),
            mutex: Mutex::new(()),
        }
    }

    pub fn global() -> Self {
        Self::new(LockMode::Global, DEFAULT_SWITCH_INTERVAL)
    }

    pub fn free() -> Self {
        Self::new(LockMode::Free, DEFAULT_SWITCH_INTERVAL)
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn switch_interval(&self) -> u64 {
        self.switch_interval
    }

    /// Blocks until the lock is ours. Returns `None` in `Free` mode.
    ///
    /// Poisoning is ignored since the lock guards no data.
    pub fn hold(&self) -> Option<MutexGuard<'_, ()>> {
        match self.mode {
            LockMode::Global => Some(self.mutex.lock().unwrap_or_else(PoisonError::into_inner)),
            LockMode::Free => None,
        }
    }
}

impl Default for InterpreterLock {
    fn default() -> Self {
        Self::global()
    }
}
