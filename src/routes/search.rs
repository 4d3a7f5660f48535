use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::search::{CourtSearchResponse, GameSearchResponse, SearchQuery},
    error::AppError,
    routes::ApiQuery,
    services::search_service,
    state::SharedState,
};

/// Search endpoints. Both coordinates select a location search, otherwise `q` is required.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/search/courts", get(search_courts))
        .route("/search/games", get(search_games))
}

/// Search courts by text or around a point.
#[utoipa::path(
    get,
    path = "/api/search/courts",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching courts", body = CourtSearchResponse),
        (status = 400, description = "Missing query or invalid location parameters")
    )
)]
pub async fn search_courts(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<CourtSearchResponse>, AppError> {
    Ok(Json(search_service::search_courts(&state, query).await?))
}

/// Search games by text or around a point.
#[utoipa::path(
    get,
    path = "/api/search/games",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching games", body = GameSearchResponse),
        (status = 400, description = "Missing query or invalid location parameters")
    )
)]
pub async fn search_games(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<GameSearchResponse>, AppError> {
    Ok(Json(search_service::search_games(&state, query).await?))
}
