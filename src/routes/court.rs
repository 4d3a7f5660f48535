use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::court::{CourtDto, CourtListQuery, CourtListResponse},
    error::AppError,
    routes::ApiQuery,
    services::court_service,
    state::SharedState,
};

/// Read-only court catalogue.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/courts", get(list_courts))
        .route("/courts/{id}", get(get_court))
}

/// List courts, optionally filtered by name substring and court type.
#[utoipa::path(
    get,
    path = "/api/courts",
    tag = "courts",
    params(CourtListQuery),
    responses((status = 200, description = "Courts ordered by name", body = CourtListResponse))
)]
pub async fn list_courts(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<CourtListQuery>,
) -> Result<Json<CourtListResponse>, AppError> {
    Ok(Json(court_service::list_courts(&state, query).await?))
}

/// Fetch one court.
#[utoipa::path(
    get,
    path = "/api/courts/{id}",
    tag = "courts",
    params(("id" = i64, Path, description = "Court identifier")),
    responses(
        (status = 200, description = "Court details", body = CourtDto),
        (status = 404, description = "Court not found")
    )
)]
pub async fn get_court(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<CourtDto>, AppError> {
    Ok(Json(court_service::get_court(&state, id).await?))
}
