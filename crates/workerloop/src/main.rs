use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use workerloop_core::{Output, RunRequest, TerminationSignal, WorkerRunner};
use workerloop_logging::{init_tracing, LogFormat};

mod config;
mod ui;
mod workers;

use config::{RunSettings, WorkerConfig};
use ui::ConsoleOutput;

#[derive(Parser, Debug)]
#[command(
    name = "workerloop",
    about = "Run long-lived workers until a time, memory or signal limit stops them",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Path to a config file (default: ./workerloop.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a worker
    Run(RunArgs),
    /// List available workers
    List,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Name of the worker to run
    worker_name: String,

    /// Seconds to sleep before the next iteration
    #[arg(long)]
    sleep: Option<f64>,

    /// The memory limit the worker can consume, e.g. 128m
    #[arg(long)]
    memory_limit: Option<String>,

    /// The time limit in seconds the worker can run
    #[arg(long)]
    time_limit: Option<u64>,
}

impl RunArgs {
    fn settings(&self) -> RunSettings {
        RunSettings {
            sleep: self.sleep,
            memory_limit: self.memory_limit.clone(),
            time_limit: self.time_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(
        &cli.log_level,
        cli.log_format.into(),
        cli.log_file.as_deref(),
    )
    .context("Failed to initialize logging")?;

    match &cli.command {
        Command::List => {
            let registry = workers::registry();
            ui::print_worker_list(&registry.names());
            Ok(())
        }
        Command::Run(args) => run(&cli, args),
    }
}

fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = load_config(cli)?.unwrap_or_default();
    let settings = args.settings().or(config.settings_for(&args.worker_name));

    let request = RunRequest {
        worker: args.worker_name.clone(),
        sleep: settings.sleep,
        memory_limit: settings.memory_limit,
        time_limit: settings.time_limit,
    };

    let output = ConsoleOutput;
    let mut runner = WorkerRunner::new(workers::registry(), Arc::new(TerminationSignal));

    match runner.run(&request, &output) {
        Ok(()) => {
            info!(worker = %request.worker, "Worker exited normally");
            Ok(())
        }
        Err(err) => {
            output.error(&err.to_string());
            std::process::exit(err.exit_code());
        }
    }
}

fn load_config(cli: &Cli) -> Result<Option<WorkerConfig>> {
    if let Some(path) = &cli.config {
        return WorkerConfig::load_from(path).map(Some);
    }

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    WorkerConfig::load(&working_dir)
}
