/// Persisted entity definitions shared by every backend.
pub mod models;
/// External full-text index over courts and games.
pub mod search_index;
/// Storage error types.
pub mod storage;
/// Primary store trait and its PostgreSQL and in-memory backends.
pub mod store;
