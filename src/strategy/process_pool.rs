//==============================================================================
// Process pool: worker processes with their own memory and their own lock
//==============================================================================

use crate::error::{DemoError, Result};
use crate::interpreter_lock::InterpreterLock;
use crate::worker::{Request, Response, LOCK_FLAG, SWITCH_INTERVAL_FLAG, WORKER_FLAG};
use crate::workload::{Outcome, Workload};
use crossbeam::channel;
use crossbeam::queue::SegQueue;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use tracing::{debug, warn};

/// How to launch one worker process.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        WorkerCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// The running executable, relaunched in worker mode.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?).arg(WORKER_FLAG))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Hands `lock`'s mode and switch interval to every worker, so each one
    /// builds an equivalent lock of its own.
    pub fn lock(self, lock: &InterpreterLock) -> Self {
        self.arg(LOCK_FLAG)
            .arg(lock.mode().as_str())
            .arg(SWITCH_INTERVAL_FLAG)
            .arg(lock.switch_interval().to_string())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
    }
}

struct WorkerProcess {
    index: usize,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    healthy: bool,
}

impl WorkerProcess {
    fn spawn(index: usize, command: &WorkerCommand) -> Result<Self> {
        let mut child = command
            .spawn()
            .map_err(|source| DemoError::WorkerSpawn { worker: index, source })?;

        match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => {
                debug!(worker = index, pid = child.id(), "worker process started");
                Ok(WorkerProcess {
                    index,
                    child,
                    stdin: Some(stdin),
                    stdout: BufReader::new(stdout),
                    healthy: true,
                })
            }
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                Err(DemoError::WorkerSpawn {
                    worker: index,
                    source: std::io::Error::new(ErrorKind::Other, "worker pipes unavailable"),
                })
            }
        }
    }

    /// Sends one task and blocks for its answer.
    fn execute(&mut self, request: &Request) -> Result<Outcome> {
        let response = match self.round_trip(request) {
            Ok(response) => response,
            Err(error) => {
                self.healthy = false;
                return Err(error);
            }
        };
        response.result.map_err(|message| DemoError::TaskFailed {
            task: request.id,
            message,
        })
    }

    fn round_trip(&mut self, request: &Request) -> Result<Response> {
        let exited = DemoError::WorkerExited { worker: self.index };
        let stdin = match self.stdin.as_mut() {
            Some(stdin) => stdin,
            None => return Err(exited),
        };

        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        if let Err(error) = stdin.write_all(line.as_bytes()).and_then(|_| stdin.flush()) {
            return Err(match error.kind() {
                ErrorKind::BrokenPipe => exited,
                _ => error.into(),
            });
        }

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(exited);
        }

        let response: Response = serde_json::from_str(&reply)?;
        if response.id != request.id {
            return Err(DemoError::TaskFailed {
                task: request.id,
                message: format!("worker {} answered task {} instead", self.index, response.id),
            });
        }
        Ok(response)
    }

    fn close_input(&mut self) {
        self.stdin.take();
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        if !self.healthy {
            let _ = self.child.kill();
        }
        self.close_input();
        match self.child.wait() {
            Ok(status) => debug!(worker = self.index, %status, "worker process reaped"),
            Err(error) => warn!(worker = self.index, %error, "failed to reap worker process"),
        }
    }
}

/// A fixed set of worker processes. Dropping the pool closes every worker's
/// input and waits for all of them to exit.
pub struct ProcessPool {
    workers: Vec<WorkerProcess>,
}

impl ProcessPool {
    pub fn spawn(size: usize, command: &WorkerCommand) -> Result<Self> {
        let workers = (0..size.max(1))
            .map(|index| WorkerProcess::spawn(index, command))
            .collect::<Result<Vec<_>>>()?;
        Ok(ProcessPool { workers })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// False once every worker has died or broken protocol.
    pub fn has_healthy_worker(&self) -> bool {
        self.workers.iter().any(|w| w.healthy)
    }

    /// Submits one task per repetition and blocks until every result is in.
    ///
    /// Workers pull task ids from a shared queue, so a slow or dead worker
    /// does not hold tasks hostage. When several tasks fail, the error of the
    /// earliest submitted one is returned.
    pub fn run(&mut self, workload: &Workload, repetitions: usize) -> Result<Vec<Outcome>> {
        if repetitions > 0 && !self.has_healthy_worker() {
            let worker = self.workers.first().map_or(0, |w| w.index);
            return Err(DemoError::WorkerExited { worker });
        }

        let queue = SegQueue::new();
        (0..repetitions).for_each(|task| queue.push(task));
        let (result_tx, result_rx) = channel::unbounded();

        thread::scope(|scope| {
            for worker in self.workers.iter_mut().filter(|w| w.healthy) {
                let queue = &queue;
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    while let Some(task) = queue.pop() {
                        let request = Request {
                            id: task,
                            workload: *workload,
                        };
                        let result = worker.execute(&request);
                        if result_tx.send((task, result)).is_err() || !worker.healthy {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        collect_results(repetitions, result_rx)
    }
}

impl Drop for ProcessPool {
    fn drop(&mut self) {
        // Let every worker see EOF before reaping any of them.
        self.workers.iter_mut().for_each(WorkerProcess::close_input);
    }
}

fn collect_results(
    repetitions: usize,
    results: impl IntoIterator<Item = (usize, Result<Outcome>)>,
) -> Result<Vec<Outcome>> {
    let mut slots: Vec<Option<Outcome>> = vec![None; repetitions];
    let mut first_error: Option<(usize, DemoError)> = None;

    for (task, result) in results {
        match result {
            Ok(outcome) => {
                if let Some(slot) = slots.get_mut(task) {
                    *slot = Some(outcome);
                }
            }
            Err(error) => {
                if first_error.as_ref().map_or(true, |(earliest, _)| task < *earliest) {
                    first_error = Some((task, error));
                }
            }
        }
    }

    if let Some((_, error)) = first_error {
        return Err(error);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(task, slot)| slot.ok_or(DemoError::MissingResult { task }))
        .collect()
}
