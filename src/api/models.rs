//! Request and response bodies exchanged with the query backend.

use crate::data::cell_value::Row;
use crate::data::distribution::DistributionSummary;
use crate::error::{PreconditionError, TransportError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Server-side identity of a loaded dataset, sent with every query and page
/// request. Serializes flat into the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetHandle {
    /// Temp path returned by an upload
    FilePath { file_path: String },
    /// Object storage reference
    Bucket {
        bucket_name: String,
        file_name: String,
    },
}

impl DatasetHandle {
    pub fn describe(&self) -> String {
        match self {
            DatasetHandle::FilePath { file_path } => file_path.clone(),
            DatasetHandle::Bucket {
                bucket_name,
                file_name,
            } => format!("{}/{}", bucket_name, file_name),
        }
    }
}

/// Where a new dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// File content uploaded as multipart field `file`
    Upload { file_name: String, bytes: Vec<u8> },
    /// Dataset already stored on the backend side
    Dataset {
        bucket_name: String,
        file_name: String,
    },
}

impl LoadSource {
    pub fn dataset(bucket_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        LoadSource::Dataset {
            bucket_name: bucket_name.into(),
            file_name: file_name.into(),
        }
    }

    /// Read a local file for upload.
    pub fn upload_file(path: &Path) -> Result<Self, TransportError> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.parquet".to_string());
        Ok(LoadSource::Upload { file_name, bytes })
    }

    /// Dataset reference taken from `bucket_name` / `file_name` URL query
    /// parameters.
    pub fn from_url(url: &str) -> Result<Self, PreconditionError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|e| PreconditionError::InvalidUrl(e.to_string()))?;

        let mut bucket_name = None;
        let mut file_name = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "bucket_name" if !value.is_empty() => bucket_name = Some(value.into_owned()),
                "file_name" if !value.is_empty() => file_name = Some(value.into_owned()),
                _ => {}
            }
        }

        let bucket_name =
            bucket_name.ok_or(PreconditionError::MissingDatasetParameter("bucket_name"))?;
        let file_name = file_name.ok_or(PreconditionError::MissingDatasetParameter("file_name"))?;
        Ok(LoadSource::Dataset {
            bucket_name,
            file_name,
        })
    }

    pub fn describe(&self) -> String {
        match self {
            LoadSource::Upload { file_name, bytes } => {
                format!("upload {} ({} bytes)", file_name, bytes.len())
            }
            LoadSource::Dataset {
                bucket_name,
                file_name,
            } => format!("{}/{}", bucket_name, file_name),
        }
    }
}

/// Body of the dataset-by-reference load call.
#[derive(Debug, Clone, Serialize)]
pub struct LoadDatasetRequest {
    pub bucket_name: String,
    pub file_name: String,
}

/// Body of both query and page calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub page: usize,
    pub page_size: usize,
    #[serde(flatten)]
    pub handle: DatasetHandle,
}

/// Columns, first page, distributions and total of a query result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    #[serde(rename = "tableData")]
    pub table_data: Vec<Row>,
    #[serde(default, deserialize_with = "lenient_distributions")]
    pub distributions: HashMap<String, DistributionSummary>,
    #[serde(default, alias = "total_rows")]
    pub total: Option<usize>,
}

impl ResultSet {
    /// Reported total, falling back to the rows actually returned.
    pub fn total_rows(&self) -> usize {
        self.total.unwrap_or(self.table_data.len())
    }
}

/// Response to a load or upload: a result set plus the handle to use from
/// now on.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadResponse {
    pub columns: Vec<String>,
    #[serde(rename = "tableData")]
    pub table_data: Vec<Row>,
    #[serde(default, deserialize_with = "lenient_distributions")]
    pub distributions: HashMap<String, DistributionSummary>,
    #[serde(default, alias = "total_rows")]
    pub total: Option<usize>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl LoadResponse {
    /// Split into the dataset handle and the initial result set. The handle
    /// comes from the response when present, otherwise from the source the
    /// load was requested with.
    pub fn into_parts(self, source: &LoadSource) -> Result<(DatasetHandle, ResultSet), TransportError> {
        let handle = match (self.file_path, self.bucket_name, self.file_name, source) {
            (Some(file_path), _, _, _) => DatasetHandle::FilePath { file_path },
            (None, Some(bucket_name), Some(file_name), _) => DatasetHandle::Bucket {
                bucket_name,
                file_name,
            },
            (
                None,
                _,
                _,
                LoadSource::Dataset {
                    bucket_name,
                    file_name,
                },
            ) => DatasetHandle::Bucket {
                bucket_name: bucket_name.clone(),
                file_name: file_name.clone(),
            },
            (None, _, _, LoadSource::Upload { .. }) => {
                return Err(TransportError::Decode(
                    "upload response did not include a file_path".to_string(),
                ))
            }
        };

        Ok((
            handle,
            ResultSet {
                columns: self.columns,
                table_data: self.table_data,
                distributions: self.distributions,
                total: self.total,
            },
        ))
    }
}

/// Response to a page call: rows only.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "tableData")]
    pub table_data: Vec<Row>,
}

/// FastAPI style error body.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}

/// Human-readable message for a failed call.
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => format!("HTTP error! status: {}", status),
    }
}

/// Keep every distribution that parses; a malformed one is logged and
/// dropped so it cannot sink the whole response.
fn lenient_distributions<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, DistributionSummary>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
    let mut distributions = HashMap::new();
    for (column, value) in raw.unwrap_or_default() {
        if value.is_null() {
            continue;
        }
        match serde_json::from_value::<DistributionSummary>(value) {
            Ok(summary) => {
                distributions.insert(column, summary);
            }
            Err(e) => {
                warn!(target: "api", "Dropping malformed distribution for '{}': {}", column, e);
            }
        }
    }
    Ok(distributions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_request_flattens_handle() {
        let request = QueryRequest {
            query: "SELECT * FROM data".to_string(),
            page: 2,
            page_size: 10,
            handle: DatasetHandle::FilePath {
                file_path: "/tmp/x.parquet".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"query": "SELECT * FROM data", "page": 2, "page_size": 10, "file_path": "/tmp/x.parquet"})
        );

        let request = QueryRequest {
            handle: DatasetHandle::Bucket {
                bucket_name: "b".to_string(),
                file_name: "f.csv".to_string(),
            },
            ..request
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["bucket_name"], "b");
        assert_eq!(value["file_name"], "f.csv");
        assert!(value.get("file_path").is_none());
    }

    #[test]
    fn test_result_set_normalization() {
        let result: ResultSet = serde_json::from_value(json!({
            "columns": ["a"],
            "tableData": [{"a": 1}, {"a": 2}],
            "total_rows": 42,
            "distributions": {
                "a": {"type": "numeric", "labels": ["0"], "counts": [2]},
                "b": {"labels": ["x"]},
                "c": null
            }
        }))
        .unwrap();
        assert_eq!(result.total_rows(), 42);
        assert!(result.distributions.contains_key("a"));
        assert!(!result.distributions.contains_key("b"));
        assert!(!result.distributions.contains_key("c"));

        let result: ResultSet =
            serde_json::from_value(json!({"columns": ["a"], "tableData": [{"a": 1}]})).unwrap();
        assert_eq!(result.total_rows(), 1);
        assert!(result.distributions.is_empty());
    }

    #[test]
    fn test_load_response_handle() {
        let response: LoadResponse = serde_json::from_value(json!({
            "columns": [], "tableData": [], "total": 0, "file_path": "/srv/tmp/a.parquet"
        }))
        .unwrap();
        let source = LoadSource::Upload {
            file_name: "a.parquet".to_string(),
            bytes: vec![],
        };
        let (handle, _) = response.into_parts(&source).unwrap();
        assert_eq!(
            handle,
            DatasetHandle::FilePath {
                file_path: "/srv/tmp/a.parquet".to_string()
            }
        );

        let response: LoadResponse =
            serde_json::from_value(json!({"columns": [], "tableData": []})).unwrap();
        let (handle, _) = response
            .into_parts(&LoadSource::dataset("bucket", "file.csv"))
            .unwrap();
        assert_eq!(handle.describe(), "bucket/file.csv");

        let response: LoadResponse =
            serde_json::from_value(json!({"columns": [], "tableData": []})).unwrap();
        assert!(response.into_parts(&source).is_err());
    }

    #[test]
    fn test_source_from_url() {
        let source =
            LoadSource::from_url("http://viewer.local/?bucket_name=krihs&file_name=pop.csv")
                .unwrap();
        assert_eq!(source, LoadSource::dataset("krihs", "pop.csv"));

        assert_eq!(
            LoadSource::from_url("http://viewer.local/?bucket_name=krihs"),
            Err(PreconditionError::MissingDatasetParameter("file_name"))
        );
        assert!(matches!(
            LoadSource::from_url("not a url"),
            Err(PreconditionError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(404, r#"{"detail": "File not found"}"#), "File not found");
        assert_eq!(
            error_message(422, r#"{"detail": [{"msg": "bad"}]}"#),
            r#"[{"msg":"bad"}]"#
        );
        assert_eq!(error_message(500, "boom"), "boom");
        assert_eq!(error_message(502, ""), "HTTP error! status: 502");
    }
}
