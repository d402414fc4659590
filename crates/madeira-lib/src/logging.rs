//! Logger factory for Lambda functions and deployment tooling.
//!
//! This module provides:
//! - [`LoggingConfig`]: Configuration for the process-wide subscriber
//! - [`get_logger`]: Install the subscriber once and hand out a named [`Logger`]
//!
//! The subscriber is installed on the first call only. Later calls may widen the
//! level filter (for example from `info` to `debug`) but never narrow it, and
//! attach the stdout sink at most once.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: Output format, either `text` (default) or `json`
//! - `RUST_LOG`: Level threshold (default: `info`)
//! - `LOGGER_NAME`: Logger name (default: `madeira`)
//!
//! # Example
//!
//! ```no_run
//! use madeira_lib::logging::{get_logger, LoggingConfig};
//!
//! let logger = get_logger(&LoggingConfig::from_env());
//! logger.info("starting deployment");
//! ```

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::{EitherWriter, MakeWriter};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt as tfmt, prelude::*, reload, Registry};

/// Default logger name used when none is configured.
pub const DEFAULT_LOGGER_NAME: &str = "madeira";

static LOGGING: OnceLock<LoggingState> = OnceLock::new();
static STDOUT_ATTACHED: AtomicBool = AtomicBool::new(false);

struct LoggingState {
    filter: reload::Handle<LevelFilter, Registry>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `timestamp - name - LEVEL - message` lines (default).
    #[default]
    Text,
    /// Flattened JSON events, suited to CloudWatch Logs.
    Json,
}

impl LogFormat {
    /// Parse a log format name.
    ///
    /// Accepts "json", "text" or "pretty" (alias for text). Anything else
    /// falls back to `Text`.
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Configuration for the logger factory.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Requested threshold; only ever widens the installed filter.
    pub level: LevelFilter,
    /// Whether to attach the stdout sink.
    pub use_stdout: bool,
    /// Name attached to events emitted through the returned [`Logger`].
    pub name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: LevelFilter::INFO,
            use_stdout: true,
            name: DEFAULT_LOGGER_NAME.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create configuration from `LOG_FORMAT`, `RUST_LOG` and `LOGGER_NAME`.
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::from_name(&v))
            .unwrap_or_default();

        let level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|v| LevelFilter::from_str(v.trim()).ok())
            .unwrap_or(LevelFilter::INFO);

        let name =
            std::env::var("LOGGER_NAME").unwrap_or_else(|_| DEFAULT_LOGGER_NAME.to_string());

        Self {
            format,
            level,
            use_stdout: true,
            name,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_stdout(mut self, use_stdout: bool) -> Self {
        self.use_stdout = use_stdout;
        self
    }
}

/// Named logging handle threaded explicitly through call sites.
///
/// Cloning is cheap. Every event carries a `logger` field which the text
/// format renders in the name column.
#[derive(Debug, Clone)]
pub struct Logger {
    name: Arc<str>,
}

impl Logger {
    /// Create a handle without touching the installed subscriber.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(logger = %self.name, "{}", message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(logger = %self.name, "{}", message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(logger = %self.name, "{}", message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(logger = %self.name, "{}", message);
    }

    pub fn trace(&self, message: impl fmt::Display) {
        tracing::trace!(logger = %self.name, "{}", message);
    }
}

/// Return a named logger, installing the process-wide subscriber on first use.
///
/// Repeated calls are idempotent: the subscriber is installed once, the level
/// threshold is lowered when `config.level` is more verbose than the current
/// one and left untouched otherwise, and the stdout sink is attached the first
/// time `use_stdout` is requested.
///
/// The threshold is process-wide rather than per name: widening it for one
/// logger makes every [`Logger`] in the process equally verbose.
pub fn get_logger(config: &LoggingConfig) -> Logger {
    let state = LOGGING.get_or_init(|| install(config));

    let requested = config.level;
    if let Err(err) = state.filter.modify(|current| {
        if requested > *current {
            *current = requested;
        }
    }) {
        tracing::debug!(error = %err, level = %requested, "log level not applied");
    }

    if config.use_stdout {
        STDOUT_ATTACHED.store(true, Ordering::Release);
    }

    Logger::new(config.name.as_str())
}

/// Current threshold of the installed subscriber, if one was installed here.
pub fn current_level() -> Option<LevelFilter> {
    LOGGING.get().and_then(|state| state.filter.clone_current())
}

fn install(config: &LoggingConfig) -> LoggingState {
    let (filter, handle) = reload::Layer::new(config.level);
    let registry = tracing_subscriber::registry().with(filter);

    // Another subscriber may already be global (test harnesses, host tooling);
    // the filter handle is still returned so repeated calls stay cheap.
    let installed = match config.format {
        LogFormat::Text => registry
            .with(
                tfmt::layer()
                    .event_format(LineFormatter)
                    .with_writer(StdoutSink),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tfmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false)
                    .flatten_event(true)
                    .with_writer(StdoutSink),
            )
            .try_init(),
    };
    if let Err(err) = installed {
        tracing::debug!(error = %err, "global subscriber already set; keeping it");
    }

    LoggingState { filter: handle }
}

/// Writer that stays silent until a caller asks for stdout output.
#[derive(Debug, Clone, Copy)]
struct StdoutSink;

impl<'a> MakeWriter<'a> for StdoutSink {
    type Writer = EitherWriter<io::Stdout, io::Sink>;

    fn make_writer(&'a self) -> Self::Writer {
        if STDOUT_ATTACHED.load(Ordering::Acquire) {
            EitherWriter::A(io::stdout())
        } else {
            EitherWriter::B(io::sink())
        }
    }
}

/// Formats events as `timestamp - name - LEVEL - message key=value...`.
struct LineFormatter;

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let name = visitor.logger.as_deref().unwrap_or_else(|| metadata.target());

        write!(
            writer,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            name,
            level_name(metadata.level()),
            visitor.message
        )?;
        for (key, value) in &visitor.fields {
            write!(writer, " {}={}", key, value)?;
        }
        writeln!(writer)
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    logger: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl LineVisitor {
    fn record(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            "logger" => self.logger = Some(value),
            name => self.fields.push((name, value)),
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{:?}", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_name() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::from_name("unknown"), LogFormat::Text);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, LevelFilter::INFO);
        assert!(config.use_stdout);
        assert_eq!(config.name, DEFAULT_LOGGER_NAME);
    }

    #[test]
    fn test_logging_config_builders() {
        let config = LoggingConfig::default()
            .with_level(LevelFilter::DEBUG)
            .with_name("deploy")
            .with_format(LogFormat::Json)
            .with_stdout(false);
        assert_eq!(config.level, LevelFilter::DEBUG);
        assert_eq!(config.name, "deploy");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.use_stdout);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(level_name(&Level::WARN), "WARNING");
        assert_eq!(level_name(&Level::ERROR), "ERROR");
        assert_eq!(level_name(&Level::DEBUG), "DEBUG");
    }

    #[test]
    fn test_logger_handle_is_named() {
        let logger = Logger::new("api");
        assert_eq!(logger.name(), "api");
        assert_eq!(logger.clone().name(), "api");
    }
}
