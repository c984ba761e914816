use crate::config::ConfigError;
use crate::strategy::Strategy;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to spawn worker process {worker}: {source}")]
    WorkerSpawn { worker: usize, source: io::Error },

    #[error("Worker process {worker} exited before returning a result")]
    WorkerExited { worker: usize },

    #[error("Malformed worker message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Task {task} failed: {message}")]
    TaskFailed { task: usize, message: String },

    #[error("No result was collected for task {task}")]
    MissingResult { task: usize },

    #[error("{strategy} results differ from the sequential run")]
    ResultMismatch { strategy: Strategy },
}

pub type Result<T, E = DemoError> = std::result::Result<T, E>;
