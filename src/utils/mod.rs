//! Utility functions and helpers
//!
//! Per-user paths and the logging setup shared by the library and the REPL.

pub mod app_paths;
pub mod file_log;
pub mod logging;
