pub mod chat;
pub mod lifecycle;

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    auth::{JwtService, PasswordHasher},
    config::AppConfig,
    dao::{search_index::SearchIndex, store::Store},
};

pub use self::chat::ChatHub;

/// Handle to [`AppState`] shared by every request.
pub type SharedState = Arc<AppState>;

/// Bound applied to index calls when no index configuration provides one.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(2);
/// Messages buffered per chat channel before slow subscribers start skipping.
const CHAT_CHANNEL_CAPACITY: usize = 64;

/// Central application state: store handle, optional search index, token service and chat fan-out.
pub struct AppState {
    store: Arc<dyn Store>,
    search_index: Option<Arc<dyn SearchIndex>>,
    search_timeout: Duration,
    jwt: JwtService,
    passwords: PasswordHasher,
    chat: ChatHub,
    game_index_writes: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn Store>,
        search_index: Option<Arc<dyn SearchIndex>>,
        config: &AppConfig,
    ) -> SharedState {
        let search_timeout = config
            .search
            .as_ref()
            .map(|search| search.timeout())
            .unwrap_or(DEFAULT_SEARCH_TIMEOUT);

        Arc::new(Self {
            store,
            search_index,
            search_timeout,
            jwt: JwtService::new(&config.auth.jwt_secret, config.auth.token_ttl()),
            passwords: PasswordHasher::new(config.auth.password_cost),
            chat: ChatHub::new(CHAT_CHANNEL_CAPACITY),
            game_index_writes: Mutex::new(()),
        })
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    /// External index, when one is configured.
    pub fn search_index(&self) -> Option<Arc<dyn SearchIndex>> {
        self.search_index.clone()
    }

    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn passwords(&self) -> PasswordHasher {
        self.passwords
    }

    pub fn chat(&self) -> &ChatHub {
        &self.chat
    }

    /// Held while a game document is read back from the store and written to the index.
    pub(crate) fn game_index_writes(&self) -> &Mutex<()> {
        &self.game_index_writes
    }
}
