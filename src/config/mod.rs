//! Configuration module
//!
//! Backend endpoints, viewer behavior and chart colors, read once at startup
//! and handed to the data view explicitly.

pub mod config;

pub use config::Config;
