//==============================================================================
// Demonstration driver
//==============================================================================

use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::interpreter_lock::LockMode;
use crate::strategy::{same_outcomes, Runner, Strategy};
use crate::timing::{measure_time, speedup};
use crate::workload::{Outcome, Workload, WorkloadKind};
use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyTiming {
    pub strategy: Strategy,
    pub elapsed: Duration,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub kind: WorkloadKind,
    pub timings: Vec<StrategyTiming>,
}

impl SectionReport {
    pub fn timing(&self, strategy: Strategy) -> Option<&StrategyTiming> {
        self.timings.iter().find(|t| t.strategy == strategy)
    }
}

/// Line printed after a strategy's timing, if any.
pub fn commentary(kind: WorkloadKind, strategy: Strategy, mode: LockMode) -> Option<&'static str> {
    match (kind, strategy, mode) {
        (_, Strategy::Sequential, _) => None,
        (WorkloadKind::CpuBound, Strategy::Threads, LockMode::Global) => Some(
            "Note that for CPU-bound tasks, threads usually do not improve performance due to the interpreter lock.",
        ),
        (WorkloadKind::CpuBound, Strategy::Threads, LockMode::Free) => Some(
            "Without an interpreter lock, threads run CPU-bound tasks in parallel as well.",
        ),
        (WorkloadKind::CpuBound, Strategy::Processes, LockMode::Global) => Some(
            "With processes, we expect to see performance improvement compared to threads in CPU-bound scenarios.",
        ),
        (WorkloadKind::CpuBound, Strategy::Processes, LockMode::Free) => Some(
            "Processes also run in parallel, but pay for process startup and result transfer.",
        ),
        (WorkloadKind::IoBound, Strategy::Threads, _) => Some(
            "For I/O-bound tasks, threads often provide a significant performance benefit.",
        ),
        (WorkloadKind::IoBound, Strategy::Processes, _) => Some(
            "Processes can also parallelize I/O, but due to overhead, the gain might not be as large as with threads.",
        ),
    }
}

pub fn format_timing_line(kind: WorkloadKind, timing: &StrategyTiming, baseline: Option<Duration>) -> String {
    let mut line = format!(
        "{} ({}): {}",
        timing.strategy,
        kind,
        format!("{:.2} s", timing.elapsed.as_secs_f64()).bold()
    );
    if let Some(ratio) = baseline.and_then(|b| speedup(b, timing.elapsed)) {
        line.push_str(&format!(" {}", format!("({ratio:.2}x vs sequential)").dimmed()));
    }
    line
}

fn print_header(out: &mut dyn Write, kind: WorkloadKind) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format!("--- {kind} Demonstration ---").cyan().bold())?;
    Ok(())
}

/// Runs every strategy in order and prints one timing line per strategy.
///
/// Fails with `ResultMismatch` if a concurrent strategy disagrees with the
/// sequential results.
fn run_section(
    runner: &Runner<'_>,
    workload: &Workload,
    repetitions: usize,
    out: &mut dyn Write,
) -> Result<SectionReport> {
    let kind = workload.kind();
    print_header(out, kind)?;

    let mut timings: Vec<StrategyTiming> = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let timed = measure_time(|| runner.run(strategy, workload, repetitions)).transpose()?;
        let timing = StrategyTiming {
            strategy,
            elapsed: timed.elapsed,
            outcomes: timed.value,
        };
        info!(%strategy, %kind, secs = timing.elapsed.as_secs_f64(), "strategy finished");

        let baseline = timings.first();
        if let Some(reference) = baseline {
            if !same_outcomes(&reference.outcomes, &timing.outcomes) {
                return Err(DemoError::ResultMismatch { strategy });
            }
        }

        writeln!(
            out,
            "{}",
            format_timing_line(kind, &timing, baseline.map(|b| b.elapsed))
        )?;
        if let Some(note) = commentary(kind, strategy, runner.lock().mode()) {
            writeln!(out, "{note}")?;
        }
        timings.push(timing);
    }

    Ok(SectionReport { kind, timings })
}

pub fn demo_cpu_bound(runner: &Runner<'_>, config: &DemoConfig, out: &mut dyn Write) -> Result<SectionReport> {
    run_section(runner, &Workload::count_primes(config.cpu.limit), config.cpu.repetitions, out)
}

pub fn demo_io_bound(runner: &Runner<'_>, config: &DemoConfig, out: &mut dyn Write) -> Result<SectionReport> {
    run_section(runner, &Workload::simulate_io(config.io.delay()), config.io.repetitions, out)
}

pub fn print_banner(runner: &Runner<'_>, out: &mut dyn Write) -> Result<()> {
    let lock = match runner.lock().mode() {
        LockMode::Global => "on",
        LockMode::Free => "off",
    };
    writeln!(
        out,
        "Logical CPUs: {}, pool workers: {}, interpreter lock: {}",
        num_cpus::get(),
        runner.workers(),
        lock
    )?;
    Ok(())
}

/// Banner, then the CPU-bound demonstration, then the I/O-bound one.
pub fn run_all(runner: &Runner<'_>, config: &DemoConfig, out: &mut dyn Write) -> Result<Vec<SectionReport>> {
    print_banner(runner, out)?;
    let cpu = demo_cpu_bound(runner, config, out)?;
    let io = demo_io_bound(runner, config, out)?;
    out.flush()?;
    Ok(vec![cpu, io])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter_lock::InterpreterLock;
    use crate::strategy::WorkerCommand;

    #[test]
    fn test_commentary_only_after_concurrent_strategies() {
        for kind in [WorkloadKind::CpuBound, WorkloadKind::IoBound] {
            for mode in [LockMode::Global, LockMode::Free] {
                assert!(commentary(kind, Strategy::Sequential, mode).is_none());
                assert!(commentary(kind, Strategy::Threads, mode).is_some());
                assert!(commentary(kind, Strategy::Processes, mode).is_some());
            }
        }
    }

    #[test]
    fn test_commentary_follows_lock_mode() {
        let with_lock = commentary(WorkloadKind::CpuBound, Strategy::Threads, LockMode::Global).unwrap();
        assert!(with_lock.contains("do not improve"));
        let without = commentary(WorkloadKind::CpuBound, Strategy::Threads, LockMode::Free).unwrap();
        assert!(without.contains("in parallel"));
    }

    #[test]
    fn test_timing_line_format() {
        let timing = StrategyTiming {
            strategy: Strategy::Threads,
            elapsed: Duration::from_millis(1_250),
            outcomes: vec![],
        };
        let line = format_timing_line(WorkloadKind::IoBound, &timing, Some(Duration::from_secs(5)));
        assert!(line.starts_with("Threads (I/O-bound): "));
        assert!(line.contains("1.25 s"));
        assert!(line.contains("4.00x vs sequential"));

        let line = format_timing_line(WorkloadKind::IoBound, &timing, None);
        assert!(!line.contains("vs sequential"));
    }

    #[test]
    fn test_report_lookup() {
        let report = SectionReport {
            kind: WorkloadKind::CpuBound,
            timings: vec![StrategyTiming {
                strategy: Strategy::Sequential,
                elapsed: Duration::ZERO,
                outcomes: vec![Outcome::Primes(4)],
            }],
        };
        assert!(report.timing(Strategy::Sequential).is_some());
        assert!(report.timing(Strategy::Processes).is_none());
    }

    #[test]
    fn test_banner_mentions_lock_state() {
        let lock = InterpreterLock::free();
        let runner = Runner::new(3, &lock, WorkerCommand::new("unused"));
        let mut out = Vec::new();
        print_banner(&runner, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("pool workers: 3"));
        assert!(text.contains("interpreter lock: off"));
    }

    #[test]
    fn test_section_stops_at_unspawnable_process_pool() {
        let lock = InterpreterLock::global();
        let runner = Runner::new(2, &lock, WorkerCommand::new("/nonexistent/cpu_vs_io_worker"));
        let mut out = Vec::new();

        let result = run_section(&runner, &Workload::count_primes(100), 2, &mut out);

        assert!(matches!(result, Err(DemoError::WorkerSpawn { .. })));
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Sequential (CPU-bound): "));
        assert!(text.contains("Threads (CPU-bound): "));
        assert!(!text.contains("Processes (CPU-bound): "));
    }
}
