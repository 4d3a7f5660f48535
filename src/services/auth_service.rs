use tokio::task;
use tracing::info;
use validator::Validate;

use crate::{
    auth::password::check_strength,
    dao::models::NewUser,
    dto::auth::{LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse},
    error::ServiceError,
    state::SharedState,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Create an account and sign the caller in.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<RegisterResponse, ServiceError> {
    request.validate()?;
    check_strength(&request.password).map_err(|reason| ServiceError::InvalidInput(reason.into()))?;

    // bcrypt is CPU bound.
    let hasher = state.passwords();
    let password = request.password;
    let password_hash = task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|err| ServiceError::Internal(format!("hashing task failed: {err}")))??;

    let user = state
        .store()
        .create_user(NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
        })
        .await?;

    let access_token = state.jwt().issue(user.id)?;
    info!(user_id = user.id, username = %user.username, "user registered");

    Ok(RegisterResponse {
        message: "User registered successfully".into(),
        access_token,
        user: user.into(),
    })
}

/// Exchange a username (or email) and password for an access token.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<LoginResponse, ServiceError> {
    request.validate()?;

    let Some(user) = state
        .store()
        .find_user_by_login(request.username.trim().to_string())
        .await?
    else {
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let hasher = state.passwords();
    let password = request.password;
    let hash = user.password_hash.clone();
    let valid = task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|err| ServiceError::Internal(format!("verification task failed: {err}")))??;
    if !valid {
        return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let access_token = state.jwt().issue(user.id)?;
    info!(user_id = user.id, "user logged in");

    Ok(LoginResponse {
        access_token,
        user: user.into(),
    })
}

/// Account of the authenticated caller.
pub async fn profile(state: &SharedState, user_id: i64) -> Result<ProfileResponse, ServiceError> {
    let user = state
        .store()
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    Ok(ProfileResponse { user: user.into() })
}
