//! Data layer for the result page
//!
//! Cell values as delivered by the backend, the local header sort, the
//! pagination cursor and the per-column distribution summaries.

pub mod cell_compare;
pub mod cell_value;
pub mod distribution;
pub mod pagination;
pub mod sort;
