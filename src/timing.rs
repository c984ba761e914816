//==============================================================================
// Wall-clock timing harness
//==============================================================================

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    /// Elapsed wall-clock time in seconds.
    pub fn secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed {
            value: f(self.value),
            elapsed: self.elapsed,
        }
    }
}

impl<T, E> Timed<Result<T, E>> {
    /// Moves the callable's error outward so it can be propagated with `?`.
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed { value, elapsed })
    }
}

/// Invokes `f` once and records how long it took.
///
/// The return value is handed back untouched and panics unwind through.
pub fn measure_time<T>(f: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let value = f();
    Timed {
        value,
        elapsed: start.elapsed(),
    }
}

/// `baseline / measured`, or `None` when `measured` is too small to divide by.
pub fn speedup(baseline: Duration, measured: Duration) -> Option<f64> {
    let measured = measured.as_secs_f64();
    (measured > f64::EPSILON).then(|| baseline.as_secs_f64() / measured)
}
