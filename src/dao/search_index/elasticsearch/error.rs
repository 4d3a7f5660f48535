//! Error types of the Elasticsearch client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::search_index::SearchIndexError;

pub type EsResult<T> = Result<T, EsError>;

/// Failures that can occur while interacting with Elasticsearch.
#[derive(Debug, Error)]
pub enum EsError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Elasticsearch client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or timed out in transit.
    #[error("failed to send Elasticsearch request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Elasticsearch returned an unexpected status code.
    #[error("unexpected Elasticsearch response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// The response body could not be decoded.
    #[error("failed to decode Elasticsearch response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<EsError> for SearchIndexError {
    fn from(err: EsError) -> Self {
        match err {
            EsError::DecodeResponse { .. } => SearchIndexError::Payload(err.to_string()),
            other => SearchIndexError::Request {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
