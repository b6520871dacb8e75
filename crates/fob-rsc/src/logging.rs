//! Subscriber setup for binaries driving fob-rsc.
//!
//! Only available with the `logging` feature. The library itself only emits
//! `tracing` events; the `fob-rsc` binary installs its subscriber here.

use std::sync::Once;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity of build output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    /// Errors and compile warnings
    Warn,
    /// Pass start/finish (default)
    #[default]
    Info,
    /// Discovered boundaries and every written file
    Debug,
}

impl LogLevel {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// How the global subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Fixed level; `None` reads `RUST_LOG` and falls back to info
    pub level: Option<LogLevel>,
    /// ANSI colours in the formatted output
    pub ansi: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: None,
            ansi: true,
        }
    }
}

impl LogOptions {
    /// Filter for these options. A fixed level ignores `RUST_LOG`.
    pub fn filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::default().add_directive(level.level_filter().into()),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::INFO.into())),
        }
    }
}

/// Install a global compact subscriber at `level`.
///
/// ```rust,no_run
/// use fob_rsc::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    init_logging_with(LogOptions {
        level: Some(level),
        ..LogOptions::default()
    });
}

/// Install a global subscriber configured from `RUST_LOG`, defaulting to info.
pub fn init_logging_from_env() {
    init_logging_with(LogOptions::default());
}

/// Install the global subscriber. Only the first call in a process has any
/// effect, and an already-installed subscriber from the host is kept.
pub fn init_logging_with(options: LogOptions) {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_ansi(options.ansi)
            .without_time()
            .compact();

        let _ = tracing_subscriber::registry()
            .with(options.filter())
            .with(fmt_layer)
            .try_init();
    });
}
