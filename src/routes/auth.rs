use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    auth::AuthUser,
    dto::auth::{LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse},
    error::AppError,
    routes::ApiJson,
    services::auth_service,
    state::SharedState,
};

/// Account endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
}

/// Create an account and return an access token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid payload or username/email already taken")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = auth_service::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for an access token. `username` also accepts the email.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(auth_service::login(&state, request).await?))
}

/// Account of the token holder.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current account", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn profile(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(auth_service::profile(&state, user.user_id).await?))
}
