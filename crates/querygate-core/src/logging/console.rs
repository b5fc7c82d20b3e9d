//! Console logger implementation

use super::traits::Logger;

/// Where informational lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    /// info to stdout, everything else to stderr
    Split,
    /// Everything to stderr. The bridge child uses this because its stdout
    /// carries the MCP stream.
    StderrOnly,
}

/// A logger that writes to the terminal
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    target: ConsoleTarget,
    verbose: bool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "[querygate]".to_string(),
            target: ConsoleTarget::Split,
            verbose: false,
        }
    }

    /// Logger for processes whose stdout is a protocol channel
    pub fn stderr_only() -> Self {
        Self {
            target: ConsoleTarget::StderrOnly,
            ..Self::new()
        }
    }

    /// Replace the line prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Also print debug lines
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        if self.verbose {
            eprintln!("{} DEBUG: {}", self.prefix, message);
        }
    }

    fn info(&self, message: &str) {
        match self.target {
            ConsoleTarget::Split => println!("{} INFO: {}", self.prefix, message),
            ConsoleTarget::StderrOnly => eprintln!("{} INFO: {}", self.prefix, message),
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("{} WARN: {}", self.prefix, message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} ERROR: {}", self.prefix, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_creation() {
        let logger = ConsoleLogger::new();
        assert_eq!(logger.prefix, "[querygate]");
        assert_eq!(logger.target(), ConsoleTarget::Split);

        let bridge = ConsoleLogger::stderr_only().with_prefix("[bridge]");
        assert_eq!(bridge.prefix, "[bridge]");
        assert_eq!(bridge.target(), ConsoleTarget::StderrOnly);
    }
}
