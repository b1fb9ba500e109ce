//! Shared utilities for the voting ledger.

pub mod logging;

pub use logging::{init_logging, try_init_logging, LogFormat, LoggingError};
