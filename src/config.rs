//==============================================================================
// Demonstration configuration
//==============================================================================
//
// Every knob has a default matching the classic demonstration (4 workers,
// 4 repetitions, primes below 50 000, 1 second sleeps), so running with no
// configuration file reproduces it exactly.

use crate::interpreter_lock::{LockMode, DEFAULT_SWITCH_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for field '{field}': {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpuDemoConfig {
    /// Primes are counted strictly below this bound.
    pub limit: u64,
    pub repetitions: usize,
}

impl Default for CpuDemoConfig {
    fn default() -> Self {
        CpuDemoConfig {
            limit: 50_000,
            repetitions: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IoDemoConfig {
    pub delay_secs: f64,
    pub repetitions: usize,
}

impl Default for IoDemoConfig {
    fn default() -> Self {
        IoDemoConfig {
            delay_secs: 1.0,
            repetitions: 4,
        }
    }
}

impl IoDemoConfig {
    /// Only meaningful after [`DemoConfig::validate`] has accepted the value.
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Size of both the thread pool and the process pool.
    pub workers: usize,
    /// Emulate a global interpreter lock for CPU-bound work.
    pub interpreter_lock: bool,
    /// Candidates examined per lock acquisition.
    pub switch_interval: u64,
    pub cpu: CpuDemoConfig,
    pub io: IoDemoConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            workers: 4,
            interpreter_lock: true,
            switch_interval: DEFAULT_SWITCH_INTERVAL,
            cpu: CpuDemoConfig::default(),
            io: IoDemoConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::invalid("workers", self.workers, "must be at least 1"));
        }
        if self.switch_interval == 0 {
            return Err(ConfigError::invalid(
                "switch_interval",
                self.switch_interval,
                "must be at least 1",
            ));
        }
        if self.cpu.repetitions == 0 {
            return Err(ConfigError::invalid(
                "cpu.repetitions",
                self.cpu.repetitions,
                "must be at least 1",
            ));
        }
        if self.io.repetitions == 0 {
            return Err(ConfigError::invalid(
                "io.repetitions",
                self.io.repetitions,
                "must be at least 1",
            ));
        }
        if !self.io.delay_secs.is_finite() || self.io.delay_secs < 0.0 {
            return Err(ConfigError::invalid(
                "io.delay_secs",
                self.io.delay_secs,
                "must be a finite, non-negative number of seconds",
            ));
        }
        if Duration::try_from_secs_f64(self.io.delay_secs).is_err() {
            return Err(ConfigError::invalid("io.delay_secs", self.io.delay_secs, "is too large"));
        }
        Ok(())
    }

    pub fn lock_mode(&self) -> LockMode {
        LockMode::from_flag(self.interpreter_lock)
    }
}
