//==============================================================================
// Workloads: one CPU-bound, one I/O-bound
//==============================================================================

use crate::interpreter_lock::InterpreterLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;
use std::time::Duration;

/// Counts the primes strictly below `limit` by trial division.
///
/// Deliberately slow: every candidate is divided by every integer from 2 up
/// to its integer square root. No sieve, no caching.
pub fn count_primes(limit: u64) -> u64 {
    count_primes_locked(limit, &InterpreterLock::free())
}

/// Same as [`count_primes`], but holds `lock` while computing and yields it
/// every `lock.switch_interval()` candidates.
pub fn count_primes_locked(limit: u64, lock: &InterpreterLock) -> u64 {
    let mut count = 0;
    let mut candidate = 2;

    while candidate < limit {
        let end = candidate.saturating_add(lock.switch_interval()).min(limit);
        let _guard = lock.hold();
        count += (candidate..end).filter(|&n| is_prime(n)).count() as u64;
        candidate = end;
    }

    count
}

fn is_prime(n: u64) -> bool {
    n >= 2 && (2..=integer_sqrt(n)).all(|divisor| n % divisor != 0)
}

/// Largest `r` with `r * r <= n`.
fn integer_sqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |sq| sq <= n) {
        root += 1;
    }
    root
}

/// Stand-in for blocking I/O: parks the thread for `delay` and echoes it.
pub fn simulate_io(delay: Duration) -> Duration {
    thread::sleep(delay);
    delay
}

//==============================================================================
// Task abstraction shared by every strategy
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Workload {
    CountPrimes { limit: u64 },
    SimulateIo { delay: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Primes(u64),
    Slept(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    CpuBound,
    IoBound,
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadKind::CpuBound => write!(f, "CPU-bound"),
            WorkloadKind::IoBound => write!(f, "I/O-bound"),
        }
    }
}

impl Workload {
    pub fn count_primes(limit: u64) -> Self {
        Workload::CountPrimes { limit }
    }

    pub fn simulate_io(delay: Duration) -> Self {
        Workload::SimulateIo { delay }
    }

    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::CountPrimes { .. } => WorkloadKind::CpuBound,
            Workload::SimulateIo { .. } => WorkloadKind::IoBound,
        }
    }

    /// Runs the workload on the calling thread.
    pub fn run(&self, lock: &InterpreterLock) -> Outcome {
        match *self {
            Workload::CountPrimes { limit } => Outcome::Primes(count_primes_locked(limit, lock)),
            Workload::SimulateIo { delay } => Outcome::Slept(simulate_io(delay)),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workload::CountPrimes { limit } => write!(f, "count_primes({limit})"),
            Workload::SimulateIo { delay } => write!(f, "simulate_io({:.3}s)", delay.as_secs_f64()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Primes(count) => write!(f, "{count} primes"),
            Outcome::Slept(delay) => write!(f, "slept {:.3}s", delay.as_secs_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter_lock::LockMode;
    use proptest::prelude::*;
    use std::time::Instant;

    fn sieve_count(limit: u64) -> u64 {
        if limit <= 2 {
            return 0;
        }
        let n = limit as usize;
        let mut composite = vec![false; n];
        let mut count = 0;
        for i in 2..n {
            if !composite[i] {
                count += 1;
                let mut j = i * i;
                while j < n {
                    composite[j] = true;
                    j += i;
                }
            }
        }
        count
    }

    #[test]
    fn test_small_bounds_have_no_primes() {
        assert_eq!(count_primes(0), 0);
        assert_eq!(count_primes(1), 0);
        assert_eq!(count_primes(2), 0);
    }

    #[test]
    fn test_bound_is_exclusive() {
        assert_eq!(count_primes(3), 1);
        assert_eq!(count_primes(7), 3);
        assert_eq!(count_primes(8), 4);
        assert_eq!(count_primes(100), 25);
    }

    #[test]
    fn test_reference_value_for_default_limit() {
        assert_eq!(count_primes(50_000), 5_133);
    }

    #[test]
    fn test_matches_sieve_up_to_a_few_thousand() {
        for limit in 0..3_000 {
            assert_eq!(count_primes(limit), sieve_count(limit), "limit = {limit}");
        }
    }

    #[test]
    fn test_locked_count_ignores_switch_interval() {
        for interval in [1, 7, 1_000, u64::MAX] {
            let lock = InterpreterLock::new(LockMode::Global, interval);
            assert_eq!(count_primes_locked(1_000, &lock), 168);
        }
    }

    #[test]
    fn test_integer_sqrt_edges() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(15), 3);
        assert_eq!(integer_sqrt(16), 4);
        assert_eq!(integer_sqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn test_simulate_io_echoes_delay() {
        let delay = Duration::from_millis(30);
        let start = Instant::now();
        assert_eq!(simulate_io(delay), delay);
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn test_simulate_io_zero_delay() {
        assert_eq!(simulate_io(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_workload_run_dispatches() {
        let lock = InterpreterLock::global();
        assert_eq!(Workload::count_primes(100).run(&lock), Outcome::Primes(25));
        let delay = Duration::from_millis(5);
        assert_eq!(Workload::simulate_io(delay).run(&lock), Outcome::Slept(delay));
    }

    #[test]
    fn test_workload_kind() {
        assert_eq!(Workload::count_primes(10).kind(), WorkloadKind::CpuBound);
        assert_eq!(Workload::simulate_io(Duration::ZERO).kind(), WorkloadKind::IoBound);
        assert_eq!(WorkloadKind::IoBound.to_string(), "I/O-bound");
    }

    #[test]
    fn test_workload_wire_format() {
        let json = serde_json::to_string(&Workload::count_primes(50_000)).unwrap();
        assert_eq!(json, r#"{"kind":"count_primes","limit":50000}"#);

        let delay = Duration::new(1, 250);
        let json = serde_json::to_string(&Outcome::Slept(delay)).unwrap();
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Outcome::Slept(delay));
    }

    proptest! {
        #[test]
        fn prop_count_matches_sieve(limit in 0u64..5_000) {
            prop_assert_eq!(count_primes(limit), sieve_count(limit));
        }

        #[test]
        fn prop_simulate_io_returns_input(millis in 0u64..5) {
            let delay = Duration::from_millis(millis);
            prop_assert_eq!(simulate_io(delay), delay);
        }
    }
}
