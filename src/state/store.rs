//! The state store: dataset identity, query text, page cursor, sort, and
//! the current page of results.
//!
//! Network calls are split in two so that overlapping requests can be
//! reconciled: `begin_*` validates and hands out a sequence-numbered
//! [`RequestTicket`], `complete_*` applies the response only if that ticket
//! is still the latest one dispatched. Older responses are discarded.

use crate::api::models::{DatasetHandle, PageResponse, QueryRequest, ResultSet};
use crate::config::config::ViewerConfig;
use crate::data::cell_value::Row;
use crate::data::distribution::DistributionSummary;
use crate::data::pagination::Pagination;
use crate::data::sort::{sorted_indices, SortState};
use crate::error::{DataViewError, PreconditionError, TransportError};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    Query,
    Page,
}

/// Proof of a dispatched request. Consumed when its response is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    kind: RequestKind,
    query: String,
    page: usize,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// What the renderers have to redo after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Header, body, charts and pagination
    All,
    /// Body and pagination; charts untouched
    Page,
    /// Header sort glyphs and body; no fetch, no chart rebuild
    Sort,
}

/// Result of handing a response back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(Refresh),
    /// A newer request was dispatched since; the response was ignored.
    Discarded,
}

/// Limits applied to query text before anything is sent.
#[derive(Debug, Clone)]
pub struct QueryRules {
    pub max_length: usize,
    pub blocked_keywords: Vec<String>,
    pub default_query: String,
}

impl From<&ViewerConfig> for QueryRules {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            max_length: config.max_query_length,
            blocked_keywords: config
                .blocked_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            default_query: config.default_query.clone(),
        }
    }
}

impl QueryRules {
    /// Reject empty (after trimming), over-long, or blocked-keyword queries.
    pub fn validate(&self, text: &str) -> Result<(), PreconditionError> {
        if text.trim().is_empty() {
            return Err(PreconditionError::EmptyQuery);
        }

        let length = text.chars().count();
        if length > self.max_length {
            return Err(PreconditionError::QueryTooLong {
                length,
                max: self.max_length,
            });
        }

        let lowered = text.to_lowercase();
        if let Some(keyword) = self
            .blocked_keywords
            .iter()
            .find(|k| !k.is_empty() && lowered.contains(k.as_str()))
        {
            return Err(PreconditionError::BlockedKeyword(keyword.clone()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DataViewState {
    handle: Option<DatasetHandle>,
    query_text: String,
    pagination: Pagination,
    sort: SortState,
    columns: Vec<String>,
    rows: Vec<Row>,
    distributions: HashMap<String, DistributionSummary>,
    loading: bool,
    error: Option<String>,
    next_seq: u64,
    latest_seq: Option<u64>,
    rules: QueryRules,
}

impl DataViewState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            handle: None,
            query_text: String::new(),
            pagination: Pagination::new(config.page_size),
            sort: SortState::default(),
            columns: Vec::new(),
            rows: Vec::new(),
            distributions: HashMap::new(),
            loading: false,
            error: None,
            next_seq: 1,
            latest_seq: None,
            rules: QueryRules::from(config),
        }
    }

    // ========== Accessors ==========

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&DatasetHandle> {
        self.handle.as_ref()
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The current page in backend order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The current page in display order.
    pub fn sorted_rows(&self) -> Vec<&Row> {
        sorted_indices(&self.rows, &self.sort)
            .into_iter()
            .map(|i| &self.rows[i])
            .collect()
    }

    pub fn distributions(&self) -> &HashMap<String, DistributionSummary> {
        &self.distributions
    }

    pub fn distribution(&self, column: &str) -> Option<&DistributionSummary> {
        self.distributions.get(column)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn rules(&self) -> &QueryRules {
        &self.rules
    }

    // ========== Dispatch ==========

    fn issue(&mut self, kind: RequestKind, query: String, page: usize) -> RequestTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.loading = true;
        debug!(target: "dataview", "Dispatching {:?} request #{}", kind, seq);
        RequestTicket {
            seq,
            kind,
            query,
            page,
        }
    }

    fn is_latest(&self, ticket: &RequestTicket) -> bool {
        self.latest_seq == Some(ticket.seq)
    }

    /// Start loading a new dataset. Always allowed.
    pub fn begin_load(&mut self) -> RequestTicket {
        let query = self.rules.default_query.clone();
        self.issue(RequestKind::Load, query, 1)
    }

    /// Validate `text` and start running it from page one.
    pub fn begin_query(
        &mut self,
        text: &str,
    ) -> Result<(RequestTicket, QueryRequest), PreconditionError> {
        let handle = self.handle.clone().ok_or(PreconditionError::NotLoaded)?;
        self.rules.validate(text)?;

        let ticket = self.issue(RequestKind::Query, text.to_string(), 1);
        let request = QueryRequest {
            query: text.to_string(),
            page: 1,
            page_size: self.pagination.page_size,
            handle,
        };
        Ok((ticket, request))
    }

    /// Start fetching rows for page `page` of the current query.
    pub fn begin_page(
        &mut self,
        page: usize,
    ) -> Result<(RequestTicket, QueryRequest), PreconditionError> {
        let handle = self.handle.clone().ok_or(PreconditionError::NotLoaded)?;
        if !self.pagination.contains(page) {
            return Err(PreconditionError::PageOutOfRange {
                page,
                total_pages: self.pagination.total_pages(),
            });
        }

        let query = self.query_text.clone();
        let ticket = self.issue(RequestKind::Page, query.clone(), page);
        let request = QueryRequest {
            query,
            page,
            page_size: self.pagination.page_size,
            handle,
        };
        Ok((ticket, request))
    }

    // ========== Completion ==========

    /// Apply a load response. Success replaces everything and resets the
    /// page cursor and sort; failure leaves an empty view with the error.
    pub fn complete_load(
        &mut self,
        ticket: RequestTicket,
        result: Result<(DatasetHandle, ResultSet), TransportError>,
    ) -> Result<Completion, DataViewError> {
        if !self.is_latest(&ticket) {
            debug!(target: "dataview", "Discarding stale load response #{}", ticket.seq);
            return Ok(Completion::Discarded);
        }
        self.loading = false;

        match result {
            Ok((handle, result)) => {
                info!(
                    target: "dataview",
                    "Loaded dataset {}: {} columns, {} total rows",
                    handle.describe(),
                    result.columns.len(),
                    result.total_rows()
                );
                self.handle = Some(handle);
                self.query_text = ticket.query;
                self.sort.clear();
                self.apply_result_set(result);
                Ok(Completion::Applied(Refresh::All))
            }
            Err(e) => {
                warn!(target: "dataview", "Dataset load failed: {}", e);
                self.reset_to_empty();
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Apply a query response. Failure keeps the previous result on screen.
    pub fn complete_query(
        &mut self,
        ticket: RequestTicket,
        result: Result<ResultSet, TransportError>,
    ) -> Result<Completion, DataViewError> {
        if !self.is_latest(&ticket) {
            debug!(target: "dataview", "Discarding stale query response #{}", ticket.seq);
            return Ok(Completion::Discarded);
        }
        self.loading = false;

        match result {
            Ok(result) => {
                info!(
                    target: "dataview",
                    "Query returned {} total rows over {} columns",
                    result.total_rows(),
                    result.columns.len()
                );
                self.query_text = ticket.query;
                if let Some(column) = &self.sort.column {
                    if !result.columns.contains(column) {
                        self.sort.clear();
                    }
                }
                self.apply_result_set(result);
                Ok(Completion::Applied(Refresh::All))
            }
            Err(e) => {
                warn!(target: "dataview", "Query execution error: {}", e);
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Apply a page response: rows and cursor only.
    pub fn complete_page(
        &mut self,
        ticket: RequestTicket,
        result: Result<PageResponse, TransportError>,
    ) -> Result<Completion, DataViewError> {
        if !self.is_latest(&ticket) {
            debug!(target: "dataview", "Discarding stale page response #{}", ticket.seq);
            return Ok(Completion::Discarded);
        }
        self.loading = false;

        match result {
            Ok(page) => {
                debug!(
                    target: "dataview",
                    "Page {} returned {} rows",
                    ticket.page,
                    page.table_data.len()
                );
                self.pagination.current_page = ticket.page;
                self.rows = page.table_data;
                self.error = None;
                Ok(Completion::Applied(Refresh::Page))
            }
            Err(e) => {
                warn!(target: "dataview", "Page fetch error: {}", e);
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    // ========== Local transitions ==========

    /// Header click on `column`. Purely local.
    pub fn set_sort(&mut self, column: &str) -> Result<Refresh, PreconditionError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(PreconditionError::UnknownColumn(column.to_string()));
        }
        self.sort.cycle(column);
        debug!(target: "dataview", "Sort is now {:?}", self.sort);
        Ok(Refresh::Sort)
    }

    fn apply_result_set(&mut self, result: ResultSet) {
        self.pagination.current_page = 1;
        self.pagination.total_rows = result.total_rows();
        self.columns = result.columns;
        self.rows = result.table_data;
        self.distributions = result.distributions;
        self.error = None;
    }

    fn reset_to_empty(&mut self) {
        self.handle = None;
        self.query_text.clear();
        self.pagination = Pagination::new(self.pagination.page_size);
        self.sort.clear();
        self.columns.clear();
        self.rows.clear();
        self.distributions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cell_value::CellValue;

    fn state() -> DataViewState {
        DataViewState::new(&ViewerConfig::default())
    }

    fn handle() -> DatasetHandle {
        DatasetHandle::FilePath {
            file_path: "/tmp/data.parquet".to_string(),
        }
    }

    fn result_set(columns: &[&str], rows: usize, total: usize) -> ResultSet {
        ResultSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            table_data: (0..rows)
                .map(|i| {
                    let mut row = Row::new();
                    row.insert(columns[0].to_string(), CellValue::Integer(i as i64));
                    row
                })
                .collect(),
            distributions: HashMap::new(),
            total: Some(total),
        }
    }

    fn loaded(total: usize) -> DataViewState {
        let mut s = state();
        let ticket = s.begin_load();
        s.complete_load(ticket, Ok((handle(), result_set(&["a", "b"], 10, total))))
            .unwrap();
        s
    }

    #[test]
    fn test_empty_state_rejects_query_and_page() {
        let mut s = state();
        assert_eq!(
            s.begin_query("SELECT * FROM data").unwrap_err(),
            PreconditionError::NotLoaded
        );
        assert_eq!(s.begin_page(1).unwrap_err(), PreconditionError::NotLoaded);
        assert!(!s.loading());
    }

    #[test]
    fn test_load_populates_state() {
        let s = loaded(95);
        assert!(s.is_loaded());
        assert_eq!(s.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(s.rows().len(), 10);
        assert_eq!(s.pagination().current_page, 1);
        assert_eq!(s.pagination().total_pages(), 10);
        assert_eq!(s.query_text(), "SELECT * FROM data");
        assert!(!s.loading());
    }

    #[test]
    fn test_query_validation() {
        let mut s = loaded(95);
        assert_eq!(
            s.begin_query("   ").unwrap_err(),
            PreconditionError::EmptyQuery
        );
        let long = "a".repeat(1001);
        assert_eq!(
            s.begin_query(&long).unwrap_err(),
            PreconditionError::QueryTooLong {
                length: 1001,
                max: 1000
            }
        );
        assert!(s.rules().validate(&"a".repeat(1000)).is_ok());
        assert_eq!(
            s.begin_query("DROP TABLE data").unwrap_err(),
            PreconditionError::BlockedKeyword("drop".to_string())
        );
        assert!(!s.loading());
    }

    #[test]
    fn test_page_bounds() {
        let mut s = loaded(95);
        assert!(matches!(
            s.begin_page(11),
            Err(PreconditionError::PageOutOfRange {
                page: 11,
                total_pages: 10
            })
        ));
        assert!(s.begin_page(0).is_err());
        let (ticket, request) = s.begin_page(10).unwrap();
        assert_eq!(request.page, 10);
        assert_eq!(request.query, "SELECT * FROM data");
        s.complete_page(ticket, Ok(PageResponse { table_data: vec![] }))
            .unwrap();
        assert_eq!(s.pagination().current_page, 10);
        assert!(!s.pagination().has_next());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut s = loaded(95);
        let (slow, _) = s.begin_query("SELECT a FROM data").unwrap();
        let (fast, _) = s.begin_query("SELECT b FROM data").unwrap();

        let applied = s
            .complete_query(fast, Ok(result_set(&["b"], 3, 3)))
            .unwrap();
        assert_eq!(applied, Completion::Applied(Refresh::All));

        let stale = s
            .complete_query(slow, Ok(result_set(&["a"], 5, 5)))
            .unwrap();
        assert_eq!(stale, Completion::Discarded);
        assert_eq!(s.columns(), &["b".to_string()]);
        assert_eq!(s.query_text(), "SELECT b FROM data");
    }

    #[test]
    fn test_stale_failure_is_silent() {
        let mut s = loaded(95);
        let (old, _) = s.begin_page(2).unwrap();
        let (_new, _) = s.begin_page(3).unwrap();
        let outcome = s
            .complete_page(old, Err(TransportError::Network("reset".to_string())))
            .unwrap();
        assert_eq!(outcome, Completion::Discarded);
        assert!(s.error().is_none());
        assert!(s.loading());
    }

    #[test]
    fn test_query_failure_retains_previous_state() {
        let mut s = loaded(95);
        let (ticket, _) = s.begin_query("SELECT x FROM data").unwrap();
        let err = s
            .complete_query(
                ticket,
                Err(TransportError::Http {
                    status: 500,
                    message: "Failed to execute query".to_string(),
                }),
            )
            .unwrap_err();
        assert!(matches!(err, DataViewError::Transport(_)));
        assert_eq!(s.rows().len(), 10);
        assert_eq!(s.query_text(), "SELECT * FROM data");
        assert!(s.error().unwrap().contains("Failed to execute query"));
        assert!(!s.loading());
    }

    #[test]
    fn test_load_failure_empties_view() {
        let mut s = loaded(95);
        let ticket = s.begin_load();
        assert!(s
            .complete_load(ticket, Err(TransportError::Network("down".to_string())))
            .is_err());
        assert!(!s.is_loaded());
        assert!(s.columns().is_empty());
        assert!(s.rows().is_empty());
        assert!(s.error().is_some());
    }

    #[test]
    fn test_reload_resets_page_and_sort() {
        let mut s = loaded(95);
        s.set_sort("a").unwrap();
        let (ticket, _) = s.begin_page(4).unwrap();
        s.complete_page(ticket, Ok(PageResponse { table_data: vec![] }))
            .unwrap();
        assert_eq!(s.pagination().current_page, 4);

        let ticket = s.begin_load();
        s.complete_load(ticket, Ok((handle(), result_set(&["a"], 2, 2))))
            .unwrap();
        assert_eq!(s.pagination().current_page, 1);
        assert!(!s.sort().is_active());
    }

    #[test]
    fn test_query_keeps_sort_only_when_column_survives() {
        let mut s = loaded(95);
        s.set_sort("b").unwrap();
        let (ticket, _) = s.begin_query("SELECT a, b FROM data").unwrap();
        s.complete_query(ticket, Ok(result_set(&["a", "b"], 1, 1)))
            .unwrap();
        assert_eq!(s.sort().column.as_deref(), Some("b"));

        let (ticket, _) = s.begin_query("SELECT a FROM data").unwrap();
        s.complete_query(ticket, Ok(result_set(&["a"], 1, 1)))
            .unwrap();
        assert!(!s.sort().is_active());
    }

    #[test]
    fn test_set_sort_unknown_column() {
        let mut s = loaded(95);
        assert_eq!(
            s.set_sort("zzz").unwrap_err(),
            PreconditionError::UnknownColumn("zzz".to_string())
        );
        assert_eq!(s.set_sort("a").unwrap(), Refresh::Sort);
    }
}
