#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::future::BoxFuture;
use serde_json::Value;

use pickleball_back::{
    config::{AppConfig, SearchIndexConfig},
    dao::{
        models::{CourtEntity, NewCourt, NewUser, UserEntity},
        search_index::{IndexCollection, SearchIndex, SearchIndexError, SearchIndexResult},
        store::{Store, memory::MemoryStore},
    },
    state::{AppState, SharedState},
};

pub fn test_config(index_timeout: Option<Duration>) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.password_cost = 4;
    config.search = index_timeout.map(|timeout| {
        let mut search = SearchIndexConfig::new("http://index.invalid");
        search.timeout_ms = timeout.as_millis() as u64;
        search
    });
    config
}

/// State over a fresh memory store, without a search index.
pub fn memory_state() -> (SharedState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), None, &test_config(None));
    (state, store)
}

/// State over a fresh memory store with `index` answering text searches.
pub fn indexed_state(
    index: Arc<dyn SearchIndex>,
    timeout: Duration,
) -> (SharedState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Some(index), &test_config(Some(timeout)));
    (state, store)
}

pub async fn add_user(store: &MemoryStore, name: &str) -> UserEntity {
    store
        .create_user(NewUser {
            username: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".into(),
        })
        .await
        .unwrap()
}

pub async fn add_court(
    store: &MemoryStore,
    name: &str,
    location: Option<(f64, f64)>,
) -> CourtEntity {
    store
        .upsert_court(NewCourt {
            uuid: format!("uuid-{name}"),
            name: name.into(),
            lat: location.map(|(lat, _)| lat),
            lng: location.map(|(_, lng)| lng),
            court_type: Some("outdoor".into()),
            ..NewCourt::default()
        })
        .await
        .unwrap()
}

/// Index answering every search with a fixed ranking.
pub struct RankedIndex {
    pub courts: Vec<i64>,
    pub games: Vec<i64>,
}

/// Index whose searches always fail.
pub struct BrokenIndex;

/// Index that never answers within a reasonable bound.
pub struct StalledIndex;

/// Index keeping every game document written to it, in write order.
#[derive(Default)]
pub struct RecordingIndex {
    pub game_writes: Mutex<Vec<Value>>,
}

impl RecordingIndex {
    pub fn game_writes(&self) -> Vec<Value> {
        self.game_writes.lock().unwrap().clone()
    }
}

fn no_op() -> BoxFuture<'static, SearchIndexResult<()>> {
    Box::pin(async { Ok(()) })
}

impl SearchIndex for RankedIndex {
    fn search(
        &self,
        collection: IndexCollection,
        _query: String,
    ) -> BoxFuture<'static, SearchIndexResult<Vec<i64>>> {
        let ids = match collection {
            IndexCollection::Courts => self.courts.clone(),
            IndexCollection::Games => self.games.clone(),
        };
        Box::pin(async move { Ok(ids) })
    }

    fn index_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
        _document: Value,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn delete_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn ensure_collections(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn health_check(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }
}

impl SearchIndex for BrokenIndex {
    fn search(
        &self,
        _collection: IndexCollection,
        _query: String,
    ) -> BoxFuture<'static, SearchIndexResult<Vec<i64>>> {
        Box::pin(async {
            Err(SearchIndexError::Request {
                message: "connection refused".into(),
                source: None,
            })
        })
    }

    fn index_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
        _document: Value,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        Box::pin(async { Err(SearchIndexError::Payload("rejected".into())) })
    }

    fn delete_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn ensure_collections(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn health_check(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        Box::pin(async { Err(SearchIndexError::Payload("red cluster".into())) })
    }
}

impl SearchIndex for StalledIndex {
    fn search(
        &self,
        _collection: IndexCollection,
        _query: String,
    ) -> BoxFuture<'static, SearchIndexResult<Vec<i64>>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        })
    }

    fn index_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
        _document: Value,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn delete_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn ensure_collections(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn health_check(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }
}

impl SearchIndex for RecordingIndex {
    fn search(
        &self,
        _collection: IndexCollection,
        _query: String,
    ) -> BoxFuture<'static, SearchIndexResult<Vec<i64>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn index_document(
        &self,
        collection: IndexCollection,
        _id: i64,
        document: Value,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        if collection == IndexCollection::Games {
            self.game_writes.lock().unwrap().push(document);
        }
        no_op()
    }

    fn delete_document(
        &self,
        _collection: IndexCollection,
        _id: i64,
    ) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn ensure_collections(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }

    fn health_check(&self) -> BoxFuture<'static, SearchIndexResult<()>> {
        no_op()
    }
}
