//! Stderr logging for the courtmap tools.
//!
//! Records from `courtmap*` targets are filtered at the project level and
//! everything else (solver crates, serde, clap) at a separate, usually
//! quieter, dependency level. Lines look like
//! `   0.012s INFO  courtmap::io: calibrated from 5 points`.

use std::fmt::Arguments;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PROJECT_PREFIX: &str = "courtmap";

/// Per-target level filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogFilter {
    /// Level for `courtmap`, `courtmap_core`, `courtmap_zones` and their modules.
    pub project: LevelFilter,
    /// Level for every other target.
    pub dependencies: LevelFilter,
}

impl LogFilter {
    /// Project output at `project`; dependencies capped at `Warn`.
    pub fn new(project: LevelFilter) -> Self {
        Self {
            project,
            dependencies: project.min(LevelFilter::Warn),
        }
    }

    pub fn with_dependencies(self, dependencies: LevelFilter) -> Self {
        Self {
            dependencies,
            ..self
        }
    }

    pub fn level_for(&self, target: &str) -> LevelFilter {
        if is_project_target(target) {
            self.project
        } else {
            self.dependencies
        }
    }

    pub fn allows(&self, target: &str, level: Level) -> bool {
        level <= self.level_for(target)
    }

    /// The most verbose level any target may log at.
    pub fn max_level(&self) -> LevelFilter {
        self.project.max(self.dependencies)
    }

    /// The same filter in `RUST_LOG` directive syntax.
    pub fn directives(&self) -> String {
        let project = directive_level(self.project);
        format!(
            "{},{PROJECT_PREFIX}={project},{PROJECT_PREFIX}_core={project},{PROJECT_PREFIX}_zones={project}",
            directive_level(self.dependencies)
        )
    }
}

fn directive_level(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

fn is_project_target(target: &str) -> bool {
    target
        .strip_prefix(PROJECT_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::") || rest.starts_with('_'))
}

fn render(elapsed: f64, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("{elapsed:8.3}s {:<5} {target}: {args}", level.as_str())
}

struct StderrLogger {
    filter: LogFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.allows(metadata.target(), metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = render(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger. Only the first call has an effect.
pub fn init_logger(filter: LogFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        filter,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(filter.max_level());
    Ok(())
}

/// Shorthand for [`init_logger`] with [`LogFilter::new`].
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    init_logger(LogFilter::new(level))
}

/// Install a `tracing` subscriber that reports span timings on close.
///
/// `RUST_LOG` overrides `filter` when set. `log` records are forwarded to
/// the subscriber.
#[cfg(feature = "tracing")]
pub fn init_tracing(
    filter: LogFilter,
    json: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.directives()));
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_timer(fmt::time::Uptime::default())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_targets_use_the_project_level() {
        let f = LogFilter::new(LevelFilter::Debug);
        assert!(f.allows("courtmap", Level::Debug));
        assert!(f.allows("courtmap_core::homography", Level::Debug));
        assert!(f.allows("courtmap_zones::dominance", Level::Debug));
        assert!(!f.allows("courtmap_core", Level::Trace));

        assert!(!f.allows("nalgebra", Level::Debug));
        assert!(!f.allows("courtmapper", Level::Debug));
        assert!(f.allows("clap_builder", Level::Warn));
        assert_eq!(f.max_level(), LevelFilter::Debug);
    }

    #[test]
    fn quiet_project_keeps_dependencies_no_louder() {
        let f = LogFilter::new(LevelFilter::Error);
        assert_eq!(f.dependencies, LevelFilter::Error);
        let loud_deps = f.with_dependencies(LevelFilter::Info);
        assert!(loud_deps.allows("serde_json", Level::Info));
        assert!(!loud_deps.allows("courtmap::io", Level::Warn));
        assert_eq!(loud_deps.max_level(), LevelFilter::Info);
    }

    #[test]
    fn directives_name_every_project_crate() {
        let f = LogFilter::new(LevelFilter::Debug);
        assert_eq!(
            f.directives(),
            "warn,courtmap=debug,courtmap_core=debug,courtmap_zones=debug"
        );
    }

    #[test]
    fn lines_carry_elapsed_level_and_target() {
        let line = render(1.5, Level::Info, "courtmap::io", &format_args!("wrote {}", 3));
        assert_eq!(line, "   1.500s INFO  courtmap::io: wrote 3");
    }

    #[test]
    fn repeated_init_is_a_no_op() {
        assert!(init_logger(LogFilter::new(LevelFilter::Warn)).is_ok());
        assert!(init_with_level(LevelFilter::Debug).is_ok());
        assert_eq!(
            LOGGER.get().map(|l| l.filter),
            Some(LogFilter::new(LevelFilter::Warn))
        );
    }
}
