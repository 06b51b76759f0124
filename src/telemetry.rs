//! Tracing subscriber setup: a stderr layer plus an optional rolling file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{FileLoggingConfig, LogFormat, LogRotation, LoggingConfig};
use crate::paths;

const LOG_FILE_PREFIX: &str = "cattree.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub verbosity: u8,
    pub logging: LoggingConfig,
}

impl TelemetryConfig {
    pub fn new(verbosity: u8, logging: LoggingConfig) -> Self {
        Self { verbosity, logging }
    }
}

/// True under `cargo test` or when `CATTREE_TESTING` is set.
pub fn is_test_env() -> bool {
    std::env::var_os("CATTREE_TESTING").is_some() || std::env::var_os("RUST_TEST_THREADS").is_some()
}

/// Keeps the non-blocking file writer alive; drop it last.
pub struct TelemetryGuard {
    _guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
}

pub fn init(config: TelemetryConfig) -> TelemetryGuard {
    let default_level = level_from_verbosity(config.verbosity);
    let filter = match config.logging.filter.as_deref() {
        Some(directives) => EnvFilter::builder()
            .with_default_directive(default_level.into())
            .parse_lossy(directives),
        None => EnvFilter::builder()
            .with_default_directive(default_level.into())
            .with_env_var("LOG")
            .from_env_lossy(),
    };

    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.logging.stdout {
        layers.push(format_layer(
            config.logging.stdout_format,
            std::io::stderr,
            true,
        ));
    }

    let mut notes: Vec<String> = Vec::new();
    if file_logging_enabled(&config.logging, is_test_env()) {
        let dir = resolve_log_dir(&config.logging.file);
        match fs::create_dir_all(&dir) {
            Ok(()) => {
                let retention = RetentionLimits::from_file_config(&config.logging.file);
                if retention.is_enabled() {
                    match prune_logs(&dir, LOG_FILE_PREFIX, retention, SystemTime::now()) {
                        Ok(removed) if removed > 0 => {
                            notes.push(format!("log retention removed {removed} file(s)"));
                        }
                        Ok(_) => {}
                        Err(err) => notes.push(format!("log retention failed: {err}")),
                    }
                }
                let (writer, guard) = tracing_appender::non_blocking(rolling_appender(
                    config.logging.file.rotation,
                    &dir,
                ));
                layers.push(format_layer(config.logging.file.format, writer, false));
                guards.push(guard);
            }
            Err(err) => {
                notes.push(format!("log dir init failed for {}: {err}", dir.display()));
            }
        }
    }

    layers.push(Box::new(filter));

    if Registry::default().with(layers).try_init().is_err() {
        // Someone (usually a test harness) already installed a subscriber.
        return TelemetryGuard { _guards: guards };
    }
    for note in notes {
        tracing::warn!("{note}");
    }

    TelemetryGuard { _guards: guards }
}

fn file_logging_enabled(logging: &LoggingConfig, is_test_env: bool) -> bool {
    logging.file.enabled && !is_test_env
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Tree => Box::new(
            tracing_tree::HierarchicalLayer::new(2)
                .with_ansi(ansi)
                .with_writer(writer),
        ),
        LogFormat::Pretty => Box::new(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        ),
        LogFormat::Compact => Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        ),
    }
}

fn rolling_appender(rotation: LogRotation, dir: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let rotation = match rotation {
        LogRotation::Daily => tracing_appender::rolling::Rotation::DAILY,
        LogRotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
        LogRotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
        LogRotation::Never => tracing_appender::rolling::Rotation::NEVER,
    };
    tracing_appender::rolling::RollingFileAppender::new(rotation, dir, LOG_FILE_PREFIX)
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

fn resolve_log_dir(config: &FileLoggingConfig) -> PathBuf {
    config.dir.clone().unwrap_or_else(paths::log_dir)
}

#[derive(Clone, Copy, Debug, Default)]
struct RetentionLimits {
    max_age: Option<Duration>,
    max_files: Option<usize>,
}

impl RetentionLimits {
    fn from_file_config(config: &FileLoggingConfig) -> Self {
        Self {
            max_age: config
                .retention_max_age_days
                .map(|days| Duration::from_secs(days.saturating_mul(24 * 60 * 60))),
            max_files: config.retention_max_files,
        }
    }

    fn is_enabled(&self) -> bool {
        self.max_age.is_some() || self.max_files.is_some()
    }
}

#[derive(Clone, Debug)]
struct LogEntry {
    path: PathBuf,
    modified: SystemTime,
}

/// Delete rotated log files beyond the retention limits. Returns how many
/// were removed; files that cannot be removed are skipped.
fn prune_logs(dir: &Path, prefix: &str, retention: RetentionLimits, now: SystemTime) -> std::io::Result<usize> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches_prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        let meta = entry.metadata()?;
        if !matches_prefix || !meta.is_file() {
            continue;
        }
        entries.push(LogEntry {
            path,
            modified: meta.modified().unwrap_or(now),
        });
    }

    let removed = expired_entries(entries, retention, now)
        .into_iter()
        .filter(|path| fs::remove_file(path).is_ok())
        .count();
    Ok(removed)
}

/// Paths to drop: everything older than `max_age`, then the oldest files
/// until at most `max_files` remain.
fn expired_entries(mut entries: Vec<LogEntry>, retention: RetentionLimits, now: SystemTime) -> Vec<PathBuf> {
    let mut expired = Vec::new();

    if let Some(max_age) = retention.max_age {
        let (old, fresh): (Vec<_>, Vec<_>) = entries.into_iter().partition(|entry| {
            now.duration_since(entry.modified).unwrap_or(Duration::ZERO) > max_age
        });
        expired.extend(old.into_iter().map(|entry| entry.path));
        entries = fresh;
    }

    if let Some(max_files) = retention.max_files
        && entries.len() > max_files
    {
        entries.sort_by_key(|entry| entry.modified);
        let excess = entries.len() - max_files;
        expired.extend(entries.drain(..excess).map(|entry| entry.path));
    }

    expired
}
