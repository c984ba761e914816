//! CPU-bound vs I/O-bound work under three execution strategies.
//!
//! Counts primes and sleeps, each four times: sequentially, on a pool of
//! threads, and on a pool of worker processes, then prints how long each
//! took. With the interpreter lock emulation on (the default), threads only
//! help the sleeping workload while processes help both.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod interpreter_lock;
pub mod strategy;
pub mod timing;
pub mod worker;
pub mod workload;

pub use config::{ConfigError, DemoConfig};
pub use error::{DemoError, Result};
pub use interpreter_lock::{InterpreterLock, LockMode};
pub use strategy::{ProcessPool, Runner, Strategy, WorkerCommand};
pub use timing::{measure_time, Timed};
pub use workload::{count_primes, simulate_io, Outcome, Workload, WorkloadKind};
