#![allow(dead_code)]

use parquet_dataview::api::models::{LoadResponse, PageResponse, QueryRequest, ResultSet};
use parquet_dataview::api::{Backend, LoadSource};
use parquet_dataview::config::Config;
use parquet_dataview::error::TransportError;
use parquet_dataview::DataView;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A request the fake backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(LoadSource),
    Query(QueryRequest),
    Page(QueryRequest),
}

/// Scripted reply: decoded JSON body or an HTTP failure.
pub enum Reply {
    Body(Value),
    Fail(u16, String),
}

/// In-memory backend that records calls and answers from per-endpoint
/// queues.
#[derive(Default)]
pub struct FakeBackend {
    calls: RefCell<Vec<Call>>,
    loads: RefCell<VecDeque<Reply>>,
    queries: RefCell<VecDeque<Reply>>,
    pages: RefCell<VecDeque<Reply>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(self, reply: Reply) -> Self {
        self.loads.borrow_mut().push_back(reply);
        self
    }

    pub fn on_query(self, reply: Reply) -> Self {
        self.queries.borrow_mut().push_back(reply);
        self
    }

    pub fn on_page(self, reply: Reply) -> Self {
        self.pages.borrow_mut().push_back(reply);
        self
    }

    pub fn push_load(&self, reply: Reply) {
        self.loads.borrow_mut().push_back(reply);
    }

    pub fn push_query(&self, reply: Reply) {
        self.queries.borrow_mut().push_back(reply);
    }

    pub fn push_page(&self, reply: Reply) {
        self.pages.borrow_mut().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn answer<T: serde::de::DeserializeOwned>(
        queue: &RefCell<VecDeque<Reply>>,
    ) -> Result<T, TransportError> {
        match queue.borrow_mut().pop_front() {
            Some(Reply::Body(body)) => Ok(serde_json::from_value(body)?),
            Some(Reply::Fail(status, message)) => Err(TransportError::Http { status, message }),
            None => Err(TransportError::Network("no scripted reply".to_string())),
        }
    }
}

impl Backend for FakeBackend {
    fn load(&self, source: &LoadSource) -> Result<LoadResponse, TransportError> {
        self.calls.borrow_mut().push(Call::Load(source.clone()));
        Self::answer(&self.loads)
    }

    fn query(&self, request: &QueryRequest) -> Result<ResultSet, TransportError> {
        self.calls.borrow_mut().push(Call::Query(request.clone()));
        Self::answer(&self.queries)
    }

    fn page(&self, request: &QueryRequest) -> Result<PageResponse, TransportError> {
        self.calls.borrow_mut().push(Call::Page(request.clone()));
        Self::answer(&self.pages)
    }
}

/// `count` rows of `{id, city, population}` starting at `first_id`.
pub fn people_rows(first_id: i64, count: usize) -> Vec<Value> {
    let cities = ["Seoul", "Busan", "Daegu", "Incheon"];
    (0..count as i64)
        .map(|i| {
            let id = first_id + i;
            json!({
                "id": id,
                "city": cities[(id as usize) % cities.len()],
                "population": (id * 1500).to_string(),
            })
        })
        .collect()
}

pub fn people_distributions() -> Value {
    json!({
        "id": {"type": "numeric", "labels": [0, 50, 100], "counts": [50, 40, 5]},
        "city": {
            "type": "categorical",
            "labels": ["Seoul", "Busan", "Daegu", "Incheon"],
            "counts": [30, 25, 20, 20]
        },
        "population": {"type": "numeric", "labels": ["0", "1000", "100000"], "counts": [3, 1, 91]}
    })
}

/// Load reply for a 95-row dataset stored at `bucket/file`.
pub fn dataset_loaded() -> Reply {
    Reply::Body(json!({
        "columns": ["id", "city", "population"],
        "tableData": people_rows(1, 10),
        "distributions": people_distributions(),
        "total": 95,
        "bucket_name": "raw",
        "file_name": "people.parquet"
    }))
}

pub fn query_result(columns: &[&str], rows: Vec<Value>, total: usize) -> Reply {
    Reply::Body(json!({
        "columns": columns,
        "tableData": rows,
        "distributions": {},
        "total": total
    }))
}

pub fn page_of(rows: Vec<Value>) -> Reply {
    Reply::Body(json!({ "tableData": rows }))
}

pub fn new_view(backend: FakeBackend) -> DataView<FakeBackend> {
    DataView::new(Config::default(), backend)
}

/// A view with the 95-row dataset loaded.
pub fn loaded_view(backend: FakeBackend) -> DataView<FakeBackend> {
    let mut view = new_view(backend.on_load(dataset_loaded()));
    view.load_dataset(LoadSource::dataset("raw", "people.parquet"))
        .expect("initial load");
    view
}
