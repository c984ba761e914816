use clap::Parser;
use colored::Colorize;
use cpu_vs_io::cli::CliArgs;
use cpu_vs_io::demo::run_all;
use cpu_vs_io::worker::serve;
use cpu_vs_io::{DemoConfig, InterpreterLock, Result, Runner, WorkerCommand};
use std::io;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    // stdout belongs to the report, or to the protocol in worker mode.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{} failed to set tracing subscriber: {}", "warning:".yellow().bold(), error);
    }
}

fn run_worker(args: &CliArgs) -> Result<()> {
    let lock = InterpreterLock::new(args.lock, args.switch_interval);
    let served = serve(io::stdin().lock(), io::stdout().lock(), &lock)?;
    debug!(served, pid = std::process::id(), "worker done");
    Ok(())
}

fn run_demo(args: &CliArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    debug!(?config, "configuration loaded");

    let lock = InterpreterLock::new(config.lock_mode(), config.switch_interval);
    let mut worker_command = WorkerCommand::current_exe()?.lock(&lock);
    if args.verbose {
        worker_command = worker_command.arg("--verbose");
    }
    let runner = Runner::new(config.workers, &lock, worker_command);

    run_all(&runner, &config, &mut io::stdout().lock())?;
    Ok(())
}

fn main() -> ExitCode {
    // Usage errors exit with status 2, --help and --version with 0.
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    let result = if args.worker {
        run_worker(&args)
    } else {
        run_demo(&args)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error);
            ExitCode::FAILURE
        }
    }
}
