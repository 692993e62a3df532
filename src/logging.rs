//! Structured logging and tracing for meterstream
//!
//! Console output plus an optional daily-rolling log file, both fed by the
//! tracing ecosystem. Components log through a `StructuredLogger` that
//! carries their name and any per-device context.

use crate::config::LoggingConfig;
use crate::error::{MeterstreamError, Result};
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{Level, Subscriber, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod level;
mod structured;

pub use level::{level_rank, min_level, parse_log_level};
pub use structured::{LogContext, StructuredLogger, get_logger, get_logger_with_context};

// The file writer stops flushing once its guard is dropped
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Effective per-output levels
#[derive(Debug, Clone, Copy)]
struct Levels {
    console: Level,
    file: Level,
}

impl Levels {
    fn resolve(config: &LoggingConfig) -> Result<Self> {
        let base = parse_log_level(&config.level)?;
        let or_base = |over: &Option<String>| {
            over.as_deref()
                .and_then(|s| parse_log_level(s).ok())
                .unwrap_or(base)
        };
        Ok(Self {
            console: or_base(&config.console_level),
            file: or_base(&config.file_level),
        })
    }

    /// Level the global filter must let through so each layer can narrow it
    fn most_verbose(self) -> Level {
        min_level(self.console, self.file)
    }
}

/// Initialize logging once per process; later calls return the first outcome
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        if let Err(e) = install(config) {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    match INIT_ERROR.get() {
        Some(err) => Err(MeterstreamError::config(err.clone())),
        None => Ok(()),
    }
}

fn install(config: &LoggingConfig) -> Result<()> {
    let levels = Levels::resolve(config)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("meterstream={},tungstenite=warn", levels.most_verbose()).into()
    });

    if console_only() {
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(formatted_layer(
                std::io::stdout,
                config.json_format,
                levels.console,
                true,
            ))
            .try_init()
            .is_ok();
        if installed {
            info!("Logging initialized - console only at {:?}", levels.console);
        }
        return Ok(());
    }

    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("meterstream")
        .filename_suffix("log")
        .max_log_files(config.backup_count.max(1) as usize)
        .build(log_directory(&config.file))
        .map_err(|e| MeterstreamError::io(format!("Failed to create log file appender: {}", e)))?;
    let (writer, guard) = non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let file_layer = formatted_layer(writer, config.json_format, levels.file, false);
    let console_layer = config.console_output.then(|| {
        formatted_layer(std::io::stdout, config.json_format, levels.console, true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| MeterstreamError::config(format!("Logging already initialized: {}", e)))?;

    info!(
        "Logging initialized - console: {:?}, file: {:?} in {}",
        levels.console,
        levels.file,
        log_directory(&config.file).display()
    );
    Ok(())
}

fn console_only() -> bool {
    cfg!(test) || std::env::var_os("METERSTREAM_DISABLE_FILE_LOG").is_some()
}

/// Directory rotated files go to: the parent of a file path, or the path itself
fn log_directory(file: &str) -> PathBuf {
    let path = Path::new(file);
    match (path.extension(), path.parent()) {
        (Some(_), Some(parent)) => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

fn formatted_layer<S, W>(writer: W, json: bool, level: Level, ansi: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_ansi(ansi);
    let only = LevelFilter::from_level(level);
    if json {
        base.json().with_filter(only).boxed()
    } else {
        base.with_filter(only).boxed()
    }
}

/// Flush stdout; the file writer flushes on its own
pub fn flush() {
    let _ = std::io::stdout().flush();
}
