//! Logging infrastructure for aliasconf.
//!
//! Library code emits records through the [`log`] facade. This module
//! provides a small stderr logger that front ends can install to see them,
//! with three verbosity levels selected by flags or the
//! `ALIASCONF_LOG_MODE` environment variable.

use std::env;
use std::fmt;
use std::str::FromStr;

use log::{LevelFilter, Metadata, Record};

/// Environment variable consulted by [`init_logger`].
pub const LOG_MODE_ENV: &str = "ALIASCONF_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Log levels are ordered from least verbose (Quiet) to most verbose (Verbose).
///
/// # Examples
///
/// ```
/// use aliasconf::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all non-essential output.
    Quiet,
    /// Errors and warnings.
    Normal,
    /// Everything, including debug and trace records.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes: "quiet", "normal", "verbose" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasconf::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("quiet").unwrap(), LogLevel::Quiet);
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("invalid").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The most detailed `log` level shown at this verbosity.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Off,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A simple stderr-based logger.
///
/// Usable directly through its `error`/`warn`/`info`/`debug` methods, or
/// installed as the global [`log`] backend with [`Logger::install`].
///
/// # Examples
///
/// ```
/// use aliasconf::{LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Normal);
/// logger.warn("cache not initialized");
/// logger.debug("not printed below Verbose");
/// ```
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a new logger with the specified log level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the current log level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Logs an error message unless the level is Quiet.
    pub fn error(&self, message: &str) {
        if self.level >= LogLevel::Normal {
            eprintln!("ERROR: {message}");
        }
    }

    /// Logs a warning message unless the level is Quiet.
    pub fn warn(&self, message: &str) {
        if self.level >= LogLevel::Normal {
            eprintln!("WARN: {message}");
        }
    }

    /// Logs an informational message at Verbose level.
    pub fn info(&self, message: &str) {
        if self.level >= LogLevel::Verbose {
            eprintln!("INFO: {message}");
        }
    }

    /// Logs a debug message at Verbose level.
    pub fn debug(&self, message: &str) {
        if self.level >= LogLevel::Verbose {
            eprintln!("DEBUG: {message}");
        }
    }

    /// Install this logger as the process-wide `log` backend.
    ///
    /// Only the first call in a process takes effect; later calls return
    /// `false` and leave the existing backend in place.
    pub fn install(self) -> bool {
        let filter = self.level.filter();
        match log::set_boxed_logger(Box::new(self)) {
            Ok(()) => {
                log::set_max_level(filter);
                true
            }
            Err(_) => false,
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Initializes a logger based on environment variables and CLI flags.
///
/// The priority order is:
/// 1. CLI flags (verbose/quiet)
/// 2. `ALIASCONF_LOG_MODE` environment variable
/// 3. Default (Normal)
///
/// If both `verbose` and `quiet` are true, `verbose` takes precedence.
///
/// # Examples
///
/// ```
/// use aliasconf::{init_logger, LogLevel};
///
/// let logger = init_logger(true, false);
/// assert_eq!(logger.level(), LogLevel::Verbose);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    if verbose {
        return Logger::new(LogLevel::Verbose);
    }
    if quiet {
        return Logger::new(LogLevel::Quiet);
    }

    if let Ok(env_value) = env::var(LOG_MODE_ENV) {
        if let Ok(level) = LogLevel::parse(&env_value) {
            return Logger::new(level);
        }
    }

    Logger::new(LogLevel::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};
    use serial_test::serial;

    /// Run `f` with `ALIASCONF_LOG_MODE` set to `value`, restoring it after.
    fn with_log_mode<F: FnOnce()>(value: Option<&str>, f: F) {
        let saved = env::var(LOG_MODE_ENV).ok();
        match value {
            Some(v) => env::set_var(LOG_MODE_ENV, v),
            None => env::remove_var(LOG_MODE_ENV),
        }
        f();
        match saved {
            Some(v) => env::set_var(LOG_MODE_ENV, v),
            None => env::remove_var(LOG_MODE_ENV),
        }
    }

    #[test]
    fn test_log_level_display_and_parse() {
        for level in [LogLevel::Quiet, LogLevel::Normal, LogLevel::Verbose] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!(LogLevel::parse("Normal").unwrap(), LogLevel::Normal);
        assert!(LogLevel::parse("").is_err());
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Quiet.filter(), LevelFilter::Off);
        assert_eq!(LogLevel::Normal.filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Verbose.filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_logger_enabled_respects_level() {
        let normal = Logger::new(LogLevel::Normal);
        let metadata = |level| Metadata::builder().level(level).build();
        assert!(normal.enabled(&metadata(Level::Warn)));
        assert!(!normal.enabled(&metadata(Level::Debug)));

        let quiet = Logger::new(LogLevel::Quiet);
        assert!(!quiet.enabled(&metadata(Level::Error)));

        let verbose = Logger::new(LogLevel::Verbose);
        assert!(verbose.enabled(&metadata(Level::Trace)));
    }

    #[test]
    fn test_logger_default() {
        assert_eq!(Logger::default().level(), LogLevel::Normal);
    }

    #[test]
    #[serial]
    fn test_init_logger_defaults() {
        with_log_mode(None, || {
            assert_eq!(init_logger(false, false).level(), LogLevel::Normal);
        });
    }

    #[test]
    fn test_init_logger_flags() {
        assert_eq!(init_logger(true, false).level(), LogLevel::Verbose);
        assert_eq!(init_logger(false, true).level(), LogLevel::Quiet);
        assert_eq!(init_logger(true, true).level(), LogLevel::Verbose);
    }

    #[test]
    #[serial]
    fn test_init_logger_from_env() {
        with_log_mode(Some("verbose"), || {
            assert_eq!(init_logger(false, false).level(), LogLevel::Verbose);
        });
        with_log_mode(Some("quiet"), || {
            assert_eq!(init_logger(false, false).level(), LogLevel::Quiet);
        });
    }

    #[test]
    #[serial]
    fn test_init_logger_env_invalid_fallback() {
        with_log_mode(Some("invalid"), || {
            assert_eq!(init_logger(false, false).level(), LogLevel::Normal);
        });
    }

    #[test]
    #[serial]
    fn test_init_logger_cli_overrides_env() {
        with_log_mode(Some("quiet"), || {
            assert_eq!(init_logger(true, false).level(), LogLevel::Verbose);
        });
    }
}
