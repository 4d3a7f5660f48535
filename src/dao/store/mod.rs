pub mod memory;
#[cfg(feature = "postgres-store")]
pub mod postgres;

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::{
    config::{StorageBackend, StorageConfig},
    dao::{
        models::{
            ChatMessageEntity, CourtEntity, CourtFilter, GameFilter, GameRecord, NewChatMessage,
            NewCourt, NewGame, NewUser, UserEntity,
        },
        storage::{StorageError, StorageResult},
    },
    state::lifecycle::LifecycleError,
};

/// Transition applied to a locked game record inside a store transaction.
pub type GameMutation =
    Box<dyn FnOnce(&mut GameRecord) -> Result<(), LifecycleError> + Send + 'static>;

/// Failure of [`Store::update_game`].
#[derive(Debug, Error)]
pub enum GameUpdateError {
    /// The transition refused the change; nothing was written.
    #[error(transparent)]
    Rejected(#[from] LifecycleError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Abstraction over the primary store holding users, courts, games and chat messages.
pub trait Store: Send + Sync {
    /// Insert a new account. Duplicate usernames or emails yield [`StorageError::Conflict`].
    fn create_user(&self, user: NewUser) -> BoxFuture<'static, StorageResult<UserEntity>>;
    fn find_user(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Look a user up by username or email.
    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;

    /// Insert or refresh a court keyed by its `uuid`.
    fn upsert_court(&self, court: NewCourt) -> BoxFuture<'static, StorageResult<CourtEntity>>;
    fn find_court(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>>;
    /// Courts matching the filter, ordered by name.
    fn list_courts(&self, filter: CourtFilter)
    -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>>;
    /// Courts whose id is in `ids`, in no particular order.
    fn find_courts(&self, ids: Vec<i64>) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>>;
    /// Every court with both coordinates set.
    fn courts_with_coordinates(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>>;
    /// Case-insensitive substring match on the court name, ordered by id.
    fn courts_matching_name(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>>;

    /// Insert the game and its creator's participant row as one unit.
    fn create_game(&self, game: NewGame) -> BoxFuture<'static, StorageResult<GameRecord>>;
    fn find_game(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameRecord>>>;
    /// Games matching the filter, ordered by (date, time, id).
    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>>;
    fn find_games(&self, ids: Vec<i64>) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>>;
    /// Case-insensitive substring match on skill level, notes or court name, ordered by id.
    fn games_matching_text(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>>;
    /// Lock the game, apply `mutation` and persist the result atomically.
    ///
    /// A missing game is reported as [`LifecycleError::GameNotFound`]. When the mutation fails the
    /// stored record is left untouched.
    fn update_game(
        &self,
        id: i64,
        mutation: GameMutation,
    ) -> BoxFuture<'static, Result<GameRecord, GameUpdateError>>;

    fn append_message(
        &self,
        message: NewChatMessage,
    ) -> BoxFuture<'static, StorageResult<ChatMessageEntity>>;
    /// Messages of a game ordered by (timestamp, id).
    fn list_messages(
        &self,
        game_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatMessageEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Build the store selected by the configuration.
pub async fn connect(config: &StorageConfig) -> StorageResult<Arc<dyn Store>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(memory::MemoryStore::new())),
        #[cfg(feature = "postgres-store")]
        StorageBackend::Postgres => {
            let store = postgres::PgStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres-store"))]
        StorageBackend::Postgres => Err(StorageError::unavailable(
            "postgres backend requested but the `postgres-store` feature is disabled".into(),
            std::io::Error::from(std::io::ErrorKind::Unsupported),
        )),
    }
}
