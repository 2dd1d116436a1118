//! State management for the data view
//!
//! Owns the dataset handle, query text, page cursor, sort and the current
//! page of rows, and reconciles backend responses into it.

pub mod store;

pub use store::{Completion, DataViewState, QueryRules, Refresh, RequestKind, RequestTicket};
