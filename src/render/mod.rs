//! Rendering: pure render-instruction models plus thin output adapters.

pub mod charts;
pub mod export;
pub mod format;
pub mod html;
pub mod table;
pub mod terminal;

pub use charts::{ChartRegistry, ChartUpdate, DistributionPass, DistributionView, Palette};
pub use table::{build_body, build_table, PaginationView, TableModel};
