//! Logging configuration for simple-ioc
//!
//! The container reports discovery, classification, resolution and failures
//! through `tracing` under the `simple_ioc` target. This module sets up a
//! subscriber for applications that do not bring their own.
//!
//! # Features
//!
//! - `logging` - Emit container diagnostics (default)
//! - `logging-json` - JSON structured output
//! - `logging-pretty` - Human-readable output
//!
//! # Environment
//!
//! `SIMPLE_IOC_LOG` takes an `EnvFilter` directive (for example
//! `simple_ioc=trace`) and, when set, replaces the level and target
//! configured on the builder.
//!
//! # Example
//!
//! ```rust,ignore
//! use simple_ioc::logging;
//!
//! logging::init();
//!
//! logging::builder()
//!     .with_level(tracing::Level::INFO)
//!     .ioc_only()
//!     .compact()
//!     .init();
//! ```

use tracing::Level;

/// Environment variable holding a filter directive that overrides the builder
pub const LOG_ENV: &str = "SIMPLE_IOC_LOG";

/// Target used by every diagnostic the container emits
pub const TARGET: &str = "simple_ioc";

/// Logging format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// JSON structured logging
    Json,
    /// Compact single-line output
    Compact,
}

/// Builder for logging configuration
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_names: bool,
    use_env: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_names: false,
            use_env: true,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    pub fn warn(self) -> Self {
        self.with_level(Level::WARN)
    }

    /// Only show logs from `target`
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show container logs
    pub fn ioc_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    /// Ignore `SIMPLE_IOC_LOG` even when it is set
    pub fn ignore_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Filter directive built from the level and target
    pub fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber globally.
    ///
    /// Does nothing if another subscriber is already installed.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let env_directive = if self.use_env {
            std::env::var(LOG_ENV).ok().filter(|d| !d.trim().is_empty())
        } else {
            None
        };
        let filter = env_directive
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(self.directive()));

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_names(self.with_thread_names)
            .with_target(true);

        let registry = tracing_subscriber::registry().with(filter);
        let _ = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(layer.json()).try_init(),
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => registry.with(layer.pretty()).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
        };
    }

    /// No-op without a subscriber feature
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize logging with default settings.
///
/// JSON when `logging-json` is enabled, otherwise pretty.
pub fn init() {
    #[cfg(feature = "logging-json")]
    init_json();
    #[cfg(not(feature = "logging-json"))]
    init_pretty();
}

pub fn init_json() {
    builder().json().init();
}

pub fn init_pretty() {
    builder().pretty().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::INFO);
        assert_eq!(builder.format, LogFormat::Pretty);
        assert!(builder.target.is_none());
        assert!(builder.use_env);
        assert_eq!(builder.directive(), "INFO");
    }

    #[test]
    fn test_builder_chain() {
        let builder = LoggingBuilder::new()
            .trace()
            .compact()
            .with_file()
            .ioc_only()
            .ignore_env();

        assert_eq!(builder.level, Level::TRACE);
        assert_eq!(builder.format, LogFormat::Compact);
        assert!(builder.with_file);
        assert!(!builder.use_env);
        assert_eq!(builder.directive(), "simple_ioc=TRACE");
    }
}
