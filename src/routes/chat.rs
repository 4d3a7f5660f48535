use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    auth::AuthUser,
    dto::chat::{ChatHistoryResponse, PostMessageRequest, PostMessageResponse},
    error::AppError,
    routes::ApiJson,
    services::{chat_service, sse_service},
    state::SharedState,
};

/// Participant-only chat endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/chat/games/{id}",
            get(list_messages).post(post_message),
        )
        .route("/chat/games/{id}/stream", get(stream_messages))
}

/// Chat history of a game.
#[utoipa::path(
    get,
    path = "/api/chat/games/{id}",
    tag = "chat",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Messages in posting order", body = ChatHistoryResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn list_messages(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    Ok(Json(chat_service::list_messages(&state, id, user.user_id).await?))
}

/// Post to the chat of a game.
#[utoipa::path(
    post,
    path = "/api/chat/games/{id}",
    tag = "chat",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Game identifier")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message stored and broadcast", body = PostMessageResponse),
        (status = 400, description = "Missing or oversized message"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn post_message(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<PostMessageResponse>), AppError> {
    let response = chat_service::post_message(&state, id, user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Stream messages posted after the connection opens. The token may be passed as `access_token`.
#[utoipa::path(
    get,
    path = "/api/chat/games/{id}/stream",
    tag = "chat",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Chat SSE stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn stream_messages(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let receiver = chat_service::subscribe(&state, id, user.user_id).await?;
    info!(game_id = id, user_id = user.user_id, "new chat SSE connection");
    Ok(sse_service::to_sse_stream(state, receiver, id, user.user_id))
}
