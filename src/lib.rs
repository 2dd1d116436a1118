pub mod api;
pub mod config;
pub mod data;
pub mod dataview;
pub mod error;
pub mod render;
pub mod state;
pub mod utils;

pub use dataview::DataView;
pub use error::{DataViewError, Result};
