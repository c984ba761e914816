//! Command-line arguments.

use crate::interpreter_lock::{LockMode, DEFAULT_SWITCH_INTERVAL};
use clap::Parser;
use std::path::PathBuf;

/// Times a CPU-bound and an I/O-bound workload run sequentially, on a thread
/// pool, and on a process pool.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "cpu_vs_io")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Read settings from a TOML file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    // ===== Worker mode (set by the process pool) =====
    /// Serve tasks on stdin/stdout instead of running the demonstration
    #[arg(long = "worker", hide = true)]
    pub worker: bool,

    /// Interpreter lock mode of a worker process
    #[arg(long = "lock", value_enum, default_value_t = LockMode::Global, hide = true)]
    pub lock: LockMode,

    /// Candidates per lock acquisition in a worker process
    #[arg(long = "switch-interval", default_value_t = DEFAULT_SWITCH_INTERVAL, hide = true)]
    pub switch_interval: u64,
}
