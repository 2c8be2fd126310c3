//! Thread-safe asynchronous logging library.
//!
//! A [`Logger`] hands formatted records to a single writer thread that owns
//! the log file. Component loggers derived with [`Logger::for_component`]
//! share that writer, so every subsystem lands in the same file in order.

pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;
