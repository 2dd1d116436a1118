use crate::api::models::{
    error_message, DatasetHandle, LoadDatasetRequest, LoadResponse, LoadSource, PageResponse,
    QueryRequest, ResultSet,
};
use crate::config::config::ApiConfig;
use crate::error::TransportError;
use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The query backend as seen by the data view: three request/response
/// calls, nothing streamed.
pub trait Backend {
    /// Upload or open a dataset and return its first page.
    fn load(&self, source: &LoadSource) -> Result<LoadResponse, TransportError>;

    /// Run a query against the loaded dataset.
    fn query(&self, request: &QueryRequest) -> Result<ResultSet, TransportError>;

    /// Fetch one page of rows for the current query.
    fn page(&self, request: &QueryRequest) -> Result<PageResponse, TransportError>;
}

/// Blocking HTTP client for the backend.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    fn query_endpoint(&self, handle: &DatasetHandle) -> &str {
        match handle {
            DatasetHandle::FilePath { .. } => &self.config.endpoints.query,
            DatasetHandle::Bucket { .. } => &self.config.endpoints.dataset_query,
        }
    }

    fn page_endpoint(&self, handle: &DatasetHandle) -> &str {
        match handle {
            DatasetHandle::FilePath { .. } => &self.config.endpoints.page,
            DatasetHandle::Bucket { .. } => &self.config.endpoints.dataset_page,
        }
    }

    /// Send a request and decode a 2xx JSON body; anything else becomes a
    /// `TransportError` carrying the backend's message.
    fn send<T: DeserializeOwned>(
        &self,
        label: &str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let started = Instant::now();
        let response = request.send()?;
        let status = response.status();
        debug!(target: "api", "{} -> {} in {:?}", label, status, started.elapsed());

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = error_message(status.as_u16(), &body);
            warn!(target: "api", "{} failed with {}: {}", label, status, message);
            return Err(TransportError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Backend for ApiClient {
    fn load(&self, source: &LoadSource) -> Result<LoadResponse, TransportError> {
        info!(target: "api", "Loading dataset: {}", source.describe());
        match source {
            LoadSource::Upload { file_name, bytes } => {
                let part = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                let form = multipart::Form::new().part("file", part);
                let request = self
                    .client
                    .post(self.url(&self.config.endpoints.init))
                    .multipart(form);
                self.send("init", request)
            }
            LoadSource::Dataset {
                bucket_name,
                file_name,
            } => {
                let body = LoadDatasetRequest {
                    bucket_name: bucket_name.clone(),
                    file_name: file_name.clone(),
                };
                let request = self
                    .client
                    .post(self.url(&self.config.endpoints.load_dataset))
                    .json(&body);
                self.send("load_dataset", request)
            }
        }
    }

    fn query(&self, request: &QueryRequest) -> Result<ResultSet, TransportError> {
        debug!(
            target: "api",
            "Sending query request: {}",
            serde_json::to_string(request).unwrap_or_default()
        );
        let builder = self
            .client
            .post(self.url(self.query_endpoint(&request.handle)))
            .json(request);
        self.send("query", builder)
    }

    fn page(&self, request: &QueryRequest) -> Result<PageResponse, TransportError> {
        debug!(target: "api", "Requesting page {} (size {})", request.page, request.page_size);
        let builder = self
            .client
            .post(self.url(self.page_endpoint(&request.handle)))
            .json(request);
        self.send("page", builder)
    }
}
