mod cmd;
mod ctx;
mod error;

use std::{
    fmt,
    io::{self, IsTerminal as _, Write as _},
    path::PathBuf,
    process::ExitCode,
};

use clap::{ArgAction, Parser};
use cmd::{Commands, Success};
use ctx::Ctx;
use error::Result;
use ipp_config::{Config, PartialConfig};
use serde_json::json;
use tracing::trace;

// Practice job interviews against the interview backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub(crate) struct Globals {
    /// Load configuration from this TOML file.
    ///
    /// Defaults to `$IPP_CONFIG_FILE`, or `ipp.toml` in the working
    /// directory if it exists.
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Base URL of the interview API.
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Fail speech sessions that close before the server confirms
    /// completion.
    #[arg(long, global = true)]
    strict_close: bool,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl Globals {
    /// Layer the global flags over `partial`.
    fn apply_cli_config(&self, partial: PartialConfig) -> PartialConfig {
        PartialConfig {
            base_url: self.base_url.clone(),
            strict_close: self.strict_close.then_some(true),
            ..PartialConfig::empty()
        }
        .with_fallback(partial)
    }
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"config", &self.globals.config)
            .entry(&"base_url", &self.globals.base_url)
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .finish()
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let is_tty = io::stdout().is_terminal();
    let quiet = cli.globals.quiet;

    configure_logging(cli.globals.verbose, quiet);
    trace!(command = cli.command.name(), arguments = %cli, "Starting CLI run.");

    match run_inner(cli).await {
        Ok(output) if quiet => {
            trace!(?output, "Suppressing output.");
            ExitCode::SUCCESS
        }
        Ok(output) => match write_output(output, is_tty) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Err(error) => {
            if !quiet {
                writeln!(io::stderr(), "Error: {error}").ok();
            }

            ExitCode::FAILURE
        }
    }
}

async fn run_inner(cli: Cli) -> Result<Success> {
    let config = load_config(&cli)?;
    trace!(?config, "Loaded configuration.");

    let ctx = Ctx::new(config);
    cli.command.run(&ctx).await
}

fn write_output(output: Success, is_tty: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();

    match output {
        Success::Ok => Ok(()),
        Success::Message(message) if is_tty => writeln!(stdout, "{message}"),
        Success::Message(message) => writeln!(stdout, "{}", json!({ "message": message })),
        Success::Json(value) if is_tty => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            writeln!(stdout, "{pretty}")
        }
        Success::Json(value) => writeln!(stdout, "{value}"),
    }
}

/// Load the configuration: file, then environment, then command-line flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let (path, required) = ipp_config::config_file(cli.globals.config.as_deref());
    trace!(path = %path.display(), required, "Resolved configuration file.");

    let partial = match ipp_config::load_partial(&path)? {
        Some(partial) => partial,
        None if required => return Err(ipp_config::Error::MissingFile(path).into()),
        None => PartialConfig::empty(),
    };

    let partial = ipp_config::load_envs(partial)?;
    let partial = cli.globals.apply_cli_config(partial);
    let partial = cli.command.apply_cli_config(partial);

    ipp_config::build(partial).map_err(Into::into)
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["cli", "client", "config", "protocol", "turn"] {
        filter.push(format!("ipp_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}
