//! Logging infrastructure for stepgen.
//!
//! Log output always goes to stderr (and optionally a file) so that stdout
//! stays reserved for generator progress and machine-readable reports.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable names.
pub mod vars {
    pub const LOG_LEVEL: &str = "STEPGEN_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "STEPGEN_LOG_FORMAT";
    pub const LOG_FILE: &str = "STEPGEN_LOG_FILE";
    pub const LOG_SOURCE: &str = "STEPGEN_LOG_SOURCE";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source location.
    pub source_location: bool,
    /// Emit ANSI colors on stderr.
    pub ansi: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Directive string understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Map a `-v` count (and `-q`) to a level.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        match verbose {
            0 if quiet => Self::Error,
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl LogFormat {
    /// Parse from string, falling back to `Pretty`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var(vars::LOG_LEVEL) {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        } else if let Ok(level) = std::env::var(vars::RUST_LOG) {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        }

        if let Ok(format) = std::env::var(vars::LOG_FORMAT) {
            config.format = LogFormat::parse(&format);
        }

        if let Ok(file_path) = std::env::var(vars::LOG_FILE) {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Ok(source_location) = std::env::var(vars::LOG_SOURCE) {
            config.source_location =
                source_location.to_lowercase() == "true" || source_location == "1";
        }

        config
    }

    /// Override the level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable ANSI colors on stderr.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

/// Initialize logging with the given configuration.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    // RUST_LOG is already folded into `config.level` by `from_env`
    let filter = EnvFilter::new(config.level.as_str());

    let file = config
        .file_path
        .as_ref()
        .map(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
        })
        .transpose()?;

    let registry = tracing_subscriber::registry().with(filter);
    let source = config.source_location;

    match config.format {
        LogFormat::Pretty => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(config.ansi)
                .with_target(true)
                .with_file(source)
                .with_line_number(source);

            let file_layer = file.map(|f| {
                fmt::layer()
                    .with_writer(Mutex::new(f))
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(source)
                    .with_line_number(source)
            });

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        LogFormat::Compact => {
            let stderr_layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.ansi);

            let file_layer = file.map(|f| {
                fmt::layer()
                    .compact()
                    .with_writer(Mutex::new(f))
                    .with_ansi(false)
            });

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        LogFormat::Json => {
            let stderr_layer = fmt::layer().json().with_writer(io::stderr);
            let file_layer = file.map(|f| fmt::layer().json().with_writer(Mutex::new(f)));

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
    }

    Ok(())
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};
