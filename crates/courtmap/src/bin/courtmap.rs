use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use courtmap::io::{run_session, IoError, SessionConfig, SessionError};
use courtmap::core::LogFilter;
use courtmap::ZoneScheme;
use log::{info, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "courtmap", version, about = "Court calibration and zone-dominance analytics")]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Log errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the homography for a session and print it as JSON.
    Calibrate {
        /// Session config (JSON).
        config: PathBuf,
    },
    /// Run calibration, projection and zone aggregation, writing a JSON report.
    Analyze {
        /// Session config (JSON).
        config: PathBuf,
        /// Report path; defaults to the config's `output_path`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a built-in zone model as JSON.
    Zones {
        #[arg(value_enum)]
        scheme: SchemeArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemeArg {
    PadelDepth,
    PadelGrid,
    TennisDepth,
}

impl From<SchemeArg> for ZoneScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::PadelDepth => ZoneScheme::PadelDepth,
            SchemeArg::PadelGrid => ZoneScheme::PadelGrid,
            SchemeArg::TennisDepth => ZoneScheme::TennisDepth,
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("session analysis failed: {0}")]
    Analysis(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };
    if let Err(err) = init_logging(LogFilter::new(level)) {
        eprintln!("error: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(filter: LogFilter) -> Result<(), Box<dyn std::error::Error>> {
    Ok(courtmap::core::init_logger(filter)?)
}

#[cfg(feature = "tracing")]
fn init_logging(filter: LogFilter) -> Result<(), Box<dyn std::error::Error>> {
    Ok(courtmap::core::init_tracing(filter, false)?)
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Calibrate { config } => {
            let cfg = SessionConfig::load_json(&config)?;
            let h = cfg.estimate()?;
            let quality = h.residuals(&cfg.calibration);
            info!(
                "rms reprojection error {:.4} m (max {:.4} m)",
                quality.rms_error, quality.max_error
            );
            println!("{}", serde_json::to_string_pretty(&h)?);
        }
        Command::Analyze { config, output } => {
            let cfg = SessionConfig::load_json(&config)?;
            let report = run_session(&cfg, Some(&config))?;
            let output_path = output.unwrap_or_else(|| cfg.output_path());
            report.write_json(&output_path)?;
            println!("wrote session report to {}", output_path.display());
            if let Some(err) = report.error {
                return Err(CliError::Analysis(err));
            }
        }
        Command::Zones { scheme } => {
            let model = ZoneScheme::from(scheme).model();
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }
    Ok(())
}
