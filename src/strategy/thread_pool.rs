use crate::error::{DemoError, Result};
use crate::interpreter_lock::InterpreterLock;
use crate::workload::{Outcome, Workload};
use tracing::debug;

/// Runs `workload` `repetitions` times on a dedicated pool of `workers`
/// threads, one spawned task per repetition.
///
/// The pool lives only for this call. `scope` returns once every task has
/// finished, and re-raises a task's panic here.
pub fn run_threads(
    workload: &Workload,
    repetitions: usize,
    workers: usize,
    lock: &InterpreterLock,
) -> Result<Vec<Outcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("pool-worker-{index}"))
        .build()?;

    let mut slots: Vec<Option<Outcome>> = vec![None; repetitions];
    pool.scope(|scope| {
        for (task, slot) in slots.iter_mut().enumerate() {
            scope.spawn(move |_| {
                debug!(task, "thread task started");
                *slot = Some(workload.run(lock));
            });
        }
    });

    slots
        .into_iter()
        .enumerate()
        .map(|(task, slot)| slot.ok_or(DemoError::MissingResult { task }))
        .collect()
}
