//! Logging utilities.
//!
//! This module centralizes logger initialization. It stays on the standard
//! `log` facade so callers are free to swap the backend later.

mod init;

pub use init::{init_logging, LoggingConfig};
