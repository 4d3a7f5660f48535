use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    auth::AuthUser,
    dto::game::{
        CreateGameRequest, CreateGameResponse, GameListQuery, GameListResponse, GameResponse,
        JoinGameResponse, MessageResponse,
    },
    error::AppError,
    routes::{ApiJson, ApiQuery},
    services::game_service,
    state::SharedState,
};

/// Game scheduling and participation endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/join", post(join_game))
        .route("/games/{id}/leave", post(leave_game))
}

/// Schedule a game; the caller becomes its creator and first participant.
#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    security(("bearer" = [])),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game scheduled", body = CreateGameResponse),
        (status = 400, description = "Missing fields or invalid values"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Court not found"),
        (status = 422, description = "Malformed date or time")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreateGameResponse>), AppError> {
    let response = game_service::create_game(&state, user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List games, `scheduled` ones unless another status is requested.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    params(GameListQuery),
    responses(
        (status = 200, description = "Games ordered by date and time", body = GameListResponse),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    ApiQuery(query): ApiQuery<GameListQuery>,
) -> Result<Json<GameListResponse>, AppError> {
    Ok(Json(game_service::list_games(&state, query).await?))
}

/// Fetch one game with participants and court.
#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game with participants and court", body = GameResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Join a game with room left.
#[utoipa::path(
    post,
    path = "/api/games/{id}/join",
    tag = "games",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Joined", body = JoinGameResponse),
        (status = 400, description = "Game full or already joined"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<JoinGameResponse>, AppError> {
    Ok(Json(game_service::join_game(&state, id, user.user_id).await?))
}

/// Leave a game. A departing creator hands the game to the earliest remaining participant.
#[utoipa::path(
    post,
    path = "/api/games/{id}/leave",
    tag = "games",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Left", body = MessageResponse),
        (status = 400, description = "Caller is not a participant"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn leave_game(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    Ok(Json(game_service::leave_game(&state, id, user.user_id).await?))
}
