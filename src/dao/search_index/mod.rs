#[cfg(feature = "elasticsearch-index")]
pub mod elasticsearch;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

use crate::config::SearchIndexConfig;

/// Collections maintained in the external full-text index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexCollection {
    Courts,
    Games,
}

impl IndexCollection {
    pub const ALL: [IndexCollection; 2] = [IndexCollection::Courts, IndexCollection::Games];

    /// Suffix appended to the configured index prefix.
    pub fn suffix(&self) -> &'static str {
        match self {
            IndexCollection::Courts => "courts",
            IndexCollection::Games => "games",
        }
    }

    /// Document field carrying the primary-store identifier.
    pub fn id_field(&self) -> &'static str {
        match self {
            IndexCollection::Courts => "court_id",
            IndexCollection::Games => "game_id",
        }
    }

    /// Fields queried by text search, with their boosts.
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            IndexCollection::Courts => &["name^3", "address", "court_type", "surface_type", "amenities"],
            IndexCollection::Games => &["court_name^2", "skill_level", "notes", "status"],
        }
    }
}

/// Failures raised by a search index backend. Never surfaced to clients.
#[derive(Debug, Error)]
pub enum SearchIndexError {
    /// The backend could not be reached or answered with an error.
    #[error("search index request failed: {message}")]
    Request {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// The backend answered with a payload that could not be understood.
    #[error("search index returned an unexpected payload: {0}")]
    Payload(String),
    /// The call did not complete within the configured bound.
    #[error("search index did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

pub type SearchIndexResult<T> = Result<T, SearchIndexError>;

/// External ranked full-text index over courts and games.
pub trait SearchIndex: Send + Sync {
    /// Identifiers of the documents matching `query`, best match first.
    fn search(
        &self,
        collection: IndexCollection,
        query: String,
    ) -> BoxFuture<'static, SearchIndexResult<Vec<i64>>>;
    /// Create or replace the document stored under `id`.
    fn index_document(
        &self,
        collection: IndexCollection,
        id: i64,
        document: Value,
    ) -> BoxFuture<'static, SearchIndexResult<()>>;
    /// Remove the document stored under `id`. Removing an absent document succeeds.
    fn delete_document(
        &self,
        collection: IndexCollection,
        id: i64,
    ) -> BoxFuture<'static, SearchIndexResult<()>>;
    /// Create the collections that do not exist yet.
    fn ensure_collections(&self) -> BoxFuture<'static, SearchIndexResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, SearchIndexResult<()>>;
}

/// Build the index client described by the configuration.
pub fn connect(config: &SearchIndexConfig) -> SearchIndexResult<Arc<dyn SearchIndex>> {
    #[cfg(feature = "elasticsearch-index")]
    {
        let client = elasticsearch::ElasticsearchIndex::new(config)?;
        Ok(Arc::new(client))
    }
    #[cfg(not(feature = "elasticsearch-index"))]
    {
        Err(SearchIndexError::Request {
            message: format!(
                "index `{}` configured but the `elasticsearch-index` feature is disabled",
                config.index
            ),
            source: None,
        })
    }
}
