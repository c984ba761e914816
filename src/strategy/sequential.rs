use crate::interpreter_lock::InterpreterLock;
use crate::workload::{Outcome, Workload};

/// Runs `workload` `repetitions` times, one after another, on this thread.
pub fn run_sequential(workload: &Workload, repetitions: usize, lock: &InterpreterLock) -> Vec<Outcome> {
    (0..repetitions).map(|_| workload.run(lock)).collect()
}
