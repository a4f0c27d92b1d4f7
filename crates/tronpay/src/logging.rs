//! # Logging
//!
//! Structured logging on the `tracing` ecosystem.
//!
//! Output goes to stdout in one of three formats, optionally mirrored to a
//! daily-rolling file. Each transfer runs inside a span carrying a
//! correlation id so its events can be grouped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tronpay::logging::{init_logging, LogConfig};
//!
//! let _guard = init_logging(&LogConfig::default()).expect("logging init");
//! tracing::info!("wallet service started");
//! ```
//!
//! ## From the configuration file
//!
//! ```no_run
//! use tronpay::logging::{init_logging, LogConfig};
//! use tronpay_core::config_loader::load_config;
//!
//! let config = load_config().expect("config");
//! let log_config = LogConfig::from_config(&config.logging).expect("valid logging section");
//! let _guard = init_logging(&log_config).expect("logging init");
//! ```
//!
//! ## Redaction
//!
//! Private keys are never passed to the logger. Other secrets, such as API
//! keys, go through [`redact_sensitive`] first:
//!
//! ```
//! use tronpay::logging::redact_sensitive;
//!
//! assert_eq!(redact_sensitive("5c8e2d1f-0b7a-4c3e"), "5c8e***4c3e");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use tronpay_core::config::LoggingConfig;

/// Target used for security events.
pub const SECURITY_TARGET: &str = "tronpay::security";

/// Error type for logging initialization failures.
#[derive(Debug)]
pub enum LogError {
    /// Failed to create log file or directory
    FileCreation(String),
    /// Failed to initialize the subscriber
    SubscriberInit(String),
    /// Invalid configuration
    InvalidConfig(String),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileCreation(msg) => write!(f, "Failed to create log file: {msg}"),
            Self::SubscriberInit(msg) => write!(f, "Failed to initialize logging: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "Invalid log configuration: {msg}"),
        }
    }
}

impl std::error::Error for LogError {}

/// Minimum severity that gets logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// trace and above
    Trace,
    /// debug and above
    Debug,
    /// info and above
    #[default]
    Info,
    /// warn and above
    Warn,
    /// error only
    Error,
}

impl LogLevel {
    /// Convert to tracing Level.
    #[must_use]
    pub const fn as_tracing_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }

    /// Get the string representation for env filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(LogError::InvalidConfig(format!("unknown log level '{other}'"))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// One JSON object per event, for log aggregation.
    Json,
    /// Single-line human-readable output.
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(LogError::InvalidConfig(format!("unknown log format '{other}'"))),
        }
    }
}

/// Configuration for the logging system.
///
/// ```
/// use tronpay::logging::{LogConfig, LogFormat, LogLevel};
///
/// let config = LogConfig {
///     level: LogLevel::Debug,
///     format: LogFormat::Json,
///     ..Default::default()
/// };
/// assert!(config.file_path.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Minimum severity. Defaults to [`LogLevel::Info`].
    pub level: LogLevel,

    /// Output format. Defaults to [`LogFormat::Pretty`].
    pub format: LogFormat,

    /// Optional log file, written in addition to stdout and rotated daily.
    /// The parent directory is created if missing.
    pub file_path: Option<PathBuf>,
}

impl LogConfig {
    /// Build from the `[logging]` section of the configuration file.
    ///
    /// `file` is used as given; expand `~` beforehand with
    /// [`expand_config_paths`](tronpay_core::config_loader::expand_config_paths).
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidConfig`] for an unknown level or format.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LogError> {
        Ok(Self {
            level: config.level.parse()?,
            format: config.format.parse()?,
            file_path: config.file.as_ref().map(PathBuf::from),
        })
    }
}

/// Keeps the file writer alive; logs are flushed when it is dropped.
pub struct LogGuard {
    guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl LogGuard {
    const fn new(guard: Option<tracing_appender::non_blocking::WorkerGuard>) -> Self {
        Self { guard }
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("has_file_guard", &self.guard.is_some())
            .finish()
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
///
/// # Errors
///
/// Returns [`LogError`] if the log directory cannot be created, the file name
/// is unusable, or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard, LogError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.as_str()))
        .map_err(|e| LogError::InvalidConfig(e.to_string()))?;

    let (file_writer, guard) = match config.file_path.as_deref() {
        Some(path) => {
            let (writer, guard) = file_appender(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Pretty => {
            let stdout = fmt::layer()
                .pretty()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE);
            let file = file_writer.map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
            });
            registry.with(stdout).with(file).try_init()
        }
        LogFormat::Json => {
            let stdout = fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true);
            let file = file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_current_span(true)
            });
            registry.with(stdout).with(file).try_init()
        }
        LogFormat::Compact => {
            let stdout = fmt::layer().compact().with_target(true);
            let file = file_writer.map(|writer| {
                fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
            });
            registry.with(stdout).with(file).try_init()
        }
    };
    result.map_err(|e| LogError::SubscriberInit(e.to_string()))?;

    Ok(LogGuard::new(guard))
}

fn file_appender(
    path: &Path,
) -> Result<
    (
        tracing_appender::non_blocking::NonBlocking,
        tracing_appender::non_blocking::WorkerGuard,
    ),
    LogError,
> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| LogError::FileCreation(format!("{}: {e}", dir.display())))?;

    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LogError::InvalidConfig("Invalid log file name".to_string()))?;

    let appender = tracing_appender::rolling::daily(dir, filename);
    Ok(tracing_appender::non_blocking(appender))
}

/// Mask a secret for logging: first and last four characters survive.
///
/// Values shorter than 12 characters are replaced entirely.
///
/// ```
/// use tronpay::logging::redact_sensitive;
///
/// assert_eq!(redact_sensitive("sk-1234567890abcdef"), "sk-1***cdef");
/// assert_eq!(redact_sensitive("secret"), "***");
/// ```
#[must_use]
pub fn redact_sensitive(value: &str) -> String {
    const MIN_LENGTH_FOR_PARTIAL: usize = 12;
    const VISIBLE_CHARS: usize = 4;

    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();

    if len < MIN_LENGTH_FOR_PARTIAL {
        return "***".to_string();
    }

    let prefix: String = chars.iter().take(VISIBLE_CHARS).collect();
    let suffix: String = chars.iter().skip(len - VISIBLE_CHARS).collect();

    format!("{prefix}***{suffix}")
}

/// A fresh correlation id: a UUID v4 as 32 lowercase hex characters.
///
/// ```
/// use tronpay::logging::new_correlation_id;
///
/// let id = new_correlation_id();
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Log a security-relevant event at INFO under [`SECURITY_TARGET`].
///
/// `details` must never contain key material.
pub fn log_security_event(event: &str, details: &str) {
    tracing::info!(
        target: SECURITY_TARGET,
        event_type = "security",
        security_event = event,
        details = details,
        "Security event: {event}"
    );
}
