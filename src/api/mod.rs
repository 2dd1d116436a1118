//! External API client and models
//!
//! This module handles communication with the query backend
//! and defines the data models for its requests/responses.

pub mod client;
pub mod models;

pub use client::{ApiClient, Backend};
pub use models::{DatasetHandle, LoadSource, QueryRequest};
