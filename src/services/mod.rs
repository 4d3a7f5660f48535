/// Account registration, login and profile.
pub mod auth_service;
/// Per-game chat history, posting and live subscriptions.
pub mod chat_service;
/// Court catalogue queries and dataset import.
pub mod court_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game scheduling, joining and leaving.
pub mod game_service;
/// Great-circle distance helpers.
pub mod geo;
/// Health check service.
pub mod health_service;
/// Best-effort synchronisation of the search index.
pub mod index_sync;
/// Text and location search with store fallback.
pub mod search_service;
/// Server-Sent Events streaming of chat messages.
pub mod sse_service;
