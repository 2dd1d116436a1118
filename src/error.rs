use thiserror::Error;

/// Everything the data view can fail with. None of these are fatal: the
/// component stays usable after any of them.
#[derive(Debug, Error)]
pub enum DataViewError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Rejected before any request is sent. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("dataset not loaded")]
    NotLoaded,
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("query too long: {length} characters (maximum is {max})")]
    QueryTooLong { length: usize, max: usize },
    #[error("keyword \"{0}\" is not allowed")]
    BlockedKeyword(String),
    #[error("page {page} is out of range (1..={total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("dataset reference is missing {0}")]
    MissingDatasetParameter(&'static str),
    #[error("invalid dataset URL: {0}")]
    InvalidUrl(String),
}

/// Network or HTTP level failure talking to the query backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error! status: {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// A single column's chart could not be built. Other columns still render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("distribution for '{column}' has {labels} labels but {counts} counts")]
    MismatchedDistribution {
        column: String,
        labels: usize,
        counts: usize,
    },
    #[error("distribution for '{0}' is empty")]
    EmptyDistribution(String),
}

pub type Result<T, E = DataViewError> = std::result::Result<T, E>;
