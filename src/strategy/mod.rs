//==============================================================================
// Execution strategies
//==============================================================================
//
// The same workload, repeated the same number of times, three ways. Every
// runner returns exactly one outcome per repetition, in submission order.

mod process_pool;
mod sequential;
mod thread_pool;

pub use process_pool::{ProcessPool, WorkerCommand};
pub use sequential::run_sequential;
pub use thread_pool::run_threads;

use crate::error::Result;
use crate::interpreter_lock::InterpreterLock;
use crate::workload::{Outcome, Workload};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Threads,
    Processes,
}

impl Strategy {
    /// Order in which the demonstration runs them.
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Threads, Strategy::Processes];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "Sequential"),
            Strategy::Threads => write!(f, "Threads"),
            Strategy::Processes => write!(f, "Processes"),
        }
    }
}

/// Everything a strategy needs besides the workload itself.
pub struct Runner<'a> {
    workers: usize,
    lock: &'a InterpreterLock,
    worker_command: WorkerCommand,
}

impl<'a> Runner<'a> {
    pub fn new(workers: usize, lock: &'a InterpreterLock, worker_command: WorkerCommand) -> Self {
        Runner {
            workers: workers.max(1),
            lock,
            worker_command,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn lock(&self) -> &InterpreterLock {
        self.lock
    }

    pub fn run(&self, strategy: Strategy, workload: &Workload, repetitions: usize) -> Result<Vec<Outcome>> {
        debug!(%strategy, %workload, repetitions, workers = self.workers, "running strategy");
        match strategy {
            Strategy::Sequential => Ok(run_sequential(workload, repetitions, self.lock)),
            Strategy::Threads => run_threads(workload, repetitions, self.workers, self.lock),
            Strategy::Processes => {
                let mut pool = ProcessPool::spawn(self.workers, &self.worker_command)?;
                pool.run(workload, repetitions)
            }
        }
    }
}

/// Multiset equality of two result collections.
pub fn same_outcomes(left: &[Outcome], right: &[Outcome]) -> bool {
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
