//! Logger module for Kindling
//!
//! Compact `[LEVEL] message` output on stderr, suitable for a host process
//! that shares its console with other tooling.
//!
//! # Usage
//!
//! ```rust
//! use kindling::util::logger;
//!
//! logger::init();
//! tracing::info!("Hello, {}", "world");
//! ```

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

static INITIALIZED: OnceCell<LogLevel> = OnceCell::new();

/// Log level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize the logger with the default configuration (INFO level)
pub fn init() {
    init_with_level(LogLevel::Info);
}

/// Initialize the logger with a custom level. Subsequent calls are no-ops.
pub fn init_with_level(level: LogLevel) {
    if INITIALIZED.set(level).is_err() {
        return;
    }

    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    Registry::default().with(layer).init();
}

/// Initialize the logger for debugging (DEBUG level)
pub fn init_debug() {
    init_with_level(LogLevel::Debug);
}
