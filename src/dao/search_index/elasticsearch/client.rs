use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::SearchIndexConfig,
    dao::search_index::{IndexCollection, SearchIndex, SearchIndexResult},
};

use super::{
    error::{EsError, EsResult},
    models::{SearchResponse, collection_mapping, multi_match_query},
};

/// Upper bound on hits requested from a single search.
const MAX_HITS: usize = 100;

/// [`SearchIndex`] talking to Elasticsearch over its REST API.
#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: Arc<str>,
    prefix: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl ElasticsearchIndex {
    /// Build a client for the configured cluster. No request is sent.
    pub fn new(config: &SearchIndexConfig) -> EsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|source| EsError::ClientBuilder { source })?;

        let auth = config
            .username
            .clone()
            .zip(config.password.clone())
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        Ok(Self {
            client,
            base_url: Arc::from(config.url.trim_end_matches('/')),
            prefix: Arc::from(config.index.as_str()),
            auth,
        })
    }

    fn index_name(&self, collection: IndexCollection) -> String {
        format!("{}_{}", self.prefix, collection.suffix())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> EsResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|source| EsError::RequestSend {
                path: path.to_string(),
                source,
            })
    }

    async fn search_ids(&self, collection: IndexCollection, query: &str) -> EsResult<Vec<i64>> {
        let path = format!("{}/_search", self.index_name(collection));
        let body = multi_match_query(collection, query, MAX_HITS);
        let response = self
            .send(self.request(Method::POST, &path).json(&body), &path)
            .await?;

        if !response.status().is_success() {
            return Err(EsError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        let payload = response
            .json::<SearchResponse>()
            .await
            .map_err(|source| EsError::DecodeResponse {
                path: path.clone(),
                source,
            })?;
        Ok(payload.ranked_ids(collection))
    }

    async fn put_document(&self, collection: IndexCollection, id: i64, document: &Value) -> EsResult<()> {
        let path = format!("{}/_doc/{id}", self.index_name(collection));
        let response = self
            .send(self.request(Method::PUT, &path).json(document), &path)
            .await?;

        if response.status().is_success() {
            debug!(path = %path, "indexed document");
            Ok(())
        } else {
            Err(EsError::RequestStatus {
                path,
                status: response.status(),
            })
        }
    }

    async fn remove_document(&self, collection: IndexCollection, id: i64) -> EsResult<()> {
        let path = format!("{}/_doc/{id}", self.index_name(collection));
        let response = self.send(self.request(Method::DELETE, &path), &path).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(path = %path, "document already absent from index");
                Ok(())
            }
            status if status.is_success() => Ok(()),
            status => Err(EsError::RequestStatus { path, status }),
        }
    }

    async fn ensure_collection(&self, collection: IndexCollection) -> EsResult<()> {
        let path = self.index_name(collection);
        let response = self.send(self.request(Method::HEAD, &path), &path).await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .send(
                        self.request(Method::PUT, &path)
                            .json(&collection_mapping(collection)),
                        &path,
                    )
                    .await?;
                if create.status().is_success() {
                    info!(index = %path, "created search index");
                    Ok(())
                } else {
                    Err(EsError::RequestStatus {
                        path,
                        status: create.status(),
                    })
                }
            }
            status => Err(EsError::RequestStatus { path, status }),
        }
    }

    async fn ping(&self) -> EsResult<()> {
        let path = "_cluster/health";
        let response = self.send(self.request(Method::GET, path), path).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(EsError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            })
        }
    }
}

impl SearchIndex for ElasticsearchIndex {
    fn search(
        &self,
        collection: IndexCollection,
        query: String,
    ) -> BoxFuture<'static, SearchIndexResult<Vec<i64>>> {
        let index = self.clone();
        Box::pin(async move { Ok(index.search_ids(collection, &query).await?) })
    }

    fn index_document(
        &self,
        collection: IndexCollection,
        id: i64,
        document: Value,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        let index = self.clone();
        Box::pin(async move { Ok(index.put_document(collection, id, &document).await?) })
    }

    fn delete_document(
        &self,
        collection: IndexCollection,
        id: i64,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        let index = self.clone();
        Box::pin(async move { Ok(index.remove_document(collection, id).await?) })
    }

    fn ensure_collections(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        let index = self.clone();
        Box::pin(async move {
            for collection in IndexCollection::ALL {
                index.ensure_collection(collection).await?;
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        let index = self.clone();
        Box::pin(async move { Ok(index.ping().await?) })
    }
}
