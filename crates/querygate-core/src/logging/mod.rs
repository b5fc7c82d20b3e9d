//! Logging abstractions
//!
//! Components receive an `Arc<dyn Logger>` and tag their lines with
//! `[Component]`. The global file log is opt-in through `QUERYGATE_DEBUG`.

mod traits;
mod noop;
mod console;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::{ConsoleLogger, ConsoleTarget};
pub use file_logger::{log_file_path, FileLogger, LogLevel, TeeLogger};
