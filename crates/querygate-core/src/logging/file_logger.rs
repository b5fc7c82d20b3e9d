//! File-based debug logger
//!
//! Process-wide log file for troubleshooting. Mostly useful for the bridge
//! child, which cannot print to stdout and whose stderr is often discarded.
//!
//! Enabled with `QUERYGATE_DEBUG=1`; threshold via `QUERYGATE_LOG_LEVEL`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

use super::traits::Logger;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Debug,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct FileLoggerState {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLoggerState {
    fn from_env() -> Self {
        let enabled = std::env::var("QUERYGATE_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("QUERYGATE_LOG_LEVEL")
            .map(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())
                .ok()
        } else {
            None
        };

        Self { file, min_level, enabled }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let timestamp = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| {
                    let secs = d.as_secs();
                    format!(
                        "{:02}:{:02}:{:02}.{:03}",
                        (secs % 86400) / 3600,
                        (secs % 3600) / 60,
                        secs % 60,
                        d.subsec_millis()
                    )
                })
                .unwrap_or_else(|_| "??:??:??.???".to_string());

            let _ = writeln!(
                file,
                "[{}] [{}] [pid {}] [{}] {}",
                timestamp,
                level,
                std::process::id(),
                module,
                message
            );
            let _ = file.flush();
        }
    }
}

static STATE: OnceLock<Mutex<FileLoggerState>> = OnceLock::new();

fn state() -> &'static Mutex<FileLoggerState> {
    STATE.get_or_init(|| Mutex::new(FileLoggerState::from_env()))
}

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    if let Ok(mut logger) = state().lock() {
        logger.write(level, module, message);
    }
}

pub fn trace(module: &str, message: &str) {
    log(LogLevel::Trace, module, message);
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Whether `QUERYGATE_DEBUG` switched the file log on
pub fn is_enabled() -> bool {
    state().lock().map(|s| s.enabled).unwrap_or(false)
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::debug(module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::info(module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::warn(module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::error(module_path!(), &format!($($arg)*))
    };
}

/// Path of the shared log file
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("querygate-debug.log")
}

/// `Logger` adapter over the global file log, tagged with a component name
#[derive(Debug, Clone)]
pub struct FileLogger {
    component: String,
}

impl FileLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        debug(&self.component, message);
    }

    fn info(&self, message: &str) {
        info(&self.component, message);
    }

    fn warn(&self, message: &str) {
        warn(&self.component, message);
    }

    fn error(&self, message: &str) {
        error(&self.component, message);
    }
}

/// Fans every line out to several loggers
pub struct TeeLogger {
    sinks: Vec<std::sync::Arc<dyn Logger>>,
}

impl TeeLogger {
    pub fn new(sinks: Vec<std::sync::Arc<dyn Logger>>) -> Self {
        Self { sinks }
    }
}

impl Logger for TeeLogger {
    fn debug(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.debug(message));
    }

    fn info(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.info(message));
    }

    fn warn(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.warn(message));
    }

    fn error(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert!(LogLevel::Debug > LogLevel::Trace);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(LogLevel::parse("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("nonsense"), LogLevel::Debug);
    }

    #[test]
    fn test_file_logger_does_not_panic_when_disabled() {
        let logger = FileLogger::new("test");
        logger.debug("debug message");
        logger.error("error message");
        debug_log!("macro {}", 1);
    }
}
