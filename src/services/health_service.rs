use tokio::time::timeout;
use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Check the store and the search index. Failures are logged and reported, never raised.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store_ok = match state.store().health_check().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            false
        }
    };

    let search_index = match state.search_index() {
        None => "disabled",
        Some(index) => match timeout(state.search_timeout(), index.health_check()).await {
            Ok(Ok(())) => "ok",
            Ok(Err(err)) => {
                warn!(error = %err, "search index health check failed");
                "unavailable"
            }
            Err(_) => {
                warn!("search index health check timed out");
                "unavailable"
            }
        },
    };

    HealthResponse::new(store_ok, search_index)
}
