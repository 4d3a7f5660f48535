use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when the store answers, "degraded" otherwise.
    pub status: String,
    /// "ok", "unavailable" or "disabled".
    pub search_index: String,
}

impl HealthResponse {
    /// Status is "ok" only when the store answered.
    pub fn new(store_ok: bool, search_index: &str) -> Self {
        Self {
            status: if store_ok { "ok" } else { "degraded" }.to_string(),
            search_index: search_index.to_string(),
        }
    }
}
