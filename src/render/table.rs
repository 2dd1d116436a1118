//! Table render instructions.
//!
//! Projects the state store into a surface-independent description of the
//! header, body and pagination bar. Adapters (html, terminal) only map this
//! onto actual output.

use crate::config::config::SortGlyphs;
use crate::data::cell_value::{cell, CellValue};
use crate::data::pagination::Pagination;
use crate::data::sort::{SortOrder, SortState};
use crate::render::charts::{DistributionPass, DistributionView};
use crate::render::format::{format_cell, format_count};
use crate::state::DataViewState;
use std::ops::RangeInclusive;

/// One clickable header cell.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub name: String,
    pub sort_order: SortOrder,
    /// Empty unless this is the active sort column
    pub glyph: String,
    pub distribution: Option<DistributionView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyCell {
    pub column: String,
    pub value: CellValue,
    /// Formatted, unescaped display text
    pub text: String,
    /// Hovering this cell may highlight a histogram bar
    pub hoverable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    pub cells: Vec<BodyCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub row_range: Option<RangeInclusive<usize>>,
}

impl PaginationView {
    pub fn from_pagination(pagination: &Pagination) -> Self {
        Self {
            current_page: pagination.current_page,
            total_pages: pagination.total_pages(),
            total_rows: pagination.total_rows,
            prev_enabled: pagination.has_prev(),
            next_enabled: pagination.has_next(),
            row_range: pagination.row_range(),
        }
    }

    /// `3 / 10`
    pub fn page_info(&self) -> String {
        format!("{} / {}", self.current_page, self.total_pages)
    }

    /// `21-30 of 95 rows`, or `0 rows` for an empty result.
    pub fn range_summary(&self) -> String {
        match &self.row_range {
            Some(range) => format!(
                "{}-{} of {} rows",
                format_count(*range.start() as u64),
                format_count(*range.end() as u64),
                format_count(self.total_rows as u64)
            ),
            None => "0 rows".to_string(),
        }
    }
}

/// Everything needed to draw the table once.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<BodyRow>,
    pub pagination: PaginationView,
    pub query_text: String,
    pub loading: bool,
    pub error: Option<String>,
    /// Inline validation message for a rejected action
    pub notice: Option<String>,
}

impl TableModel {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn header(&self, column: &str) -> Option<&HeaderCell> {
        self.headers.iter().find(|h| h.name == column)
    }
}

pub fn sort_glyph(sort: &SortState, column: &str, glyphs: &SortGlyphs) -> String {
    match sort.order_for(column) {
        SortOrder::Ascending => glyphs.ascending.clone(),
        SortOrder::Descending => glyphs.descending.clone(),
        SortOrder::None => String::new(),
    }
}

pub fn build_headers(
    state: &DataViewState,
    pass: &DistributionPass,
    glyphs: &SortGlyphs,
) -> Vec<HeaderCell> {
    state
        .columns()
        .iter()
        .map(|name| HeaderCell {
            name: name.clone(),
            sort_order: state.sort().order_for(name),
            glyph: sort_glyph(state.sort(), name, glyphs),
            distribution: pass.view_for(name).cloned(),
        })
        .collect()
}

/// Body rows in the current local sort order.
pub fn build_body(state: &DataViewState) -> Vec<BodyRow> {
    let numeric_columns: Vec<(&String, bool)> = state
        .columns()
        .iter()
        .map(|c| {
            let numeric = state.distribution(c).map_or(false, |d| d.is_numeric());
            (c, numeric)
        })
        .collect();

    state
        .sorted_rows()
        .into_iter()
        .map(|row| BodyRow {
            cells: numeric_columns
                .iter()
                .map(|&(column, numeric)| {
                    let value = cell(row, column).clone();
                    BodyCell {
                        text: format_cell(&value, column, numeric),
                        hoverable: numeric && value.is_numeric(),
                        column: column.clone(),
                        value,
                    }
                })
                .collect(),
        })
        .collect()
}

pub fn build_table(
    state: &DataViewState,
    pass: &DistributionPass,
    glyphs: &SortGlyphs,
) -> TableModel {
    TableModel {
        headers: build_headers(state, pass, glyphs),
        rows: build_body(state),
        pagination: PaginationView::from_pagination(state.pagination()),
        query_text: state.query_text().to_string(),
        loading: state.loading(),
        error: state.error().map(str::to_string),
        notice: None,
    }
}
