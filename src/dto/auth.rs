use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::UserEntity, dto::format_timestamp};

/// Account creation payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Unique login name.
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    /// Unique contact address; also accepted at login.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// At least eight characters with a letter and a digit.
    pub password: String,
}

/// Login payload. `username` also accepts the account email.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub username: String,
    /// Plain-text password, checked against the stored hash.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDto {
    /// Account identifier.
    pub user_id: i64,
    /// Unique login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Registration time, RFC 3339.
    pub created_at: String,
}

impl From<UserEntity> for UserDto {
    fn from(user: UserEntity) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
            created_at: format_timestamp(user.created_at),
        }
    }
}

/// Answer to a successful registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Bearer token for the new account.
    pub access_token: String,
    /// The account just created.
    pub user: UserDto,
}

/// Answer to a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// The authenticated account.
    pub user: UserDto,
}

/// Profile of the authenticated caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// The caller's account.
    pub user: UserDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_payload_rules() {
        let ok = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret123".into(),
        };
        let short_name = RegisterRequest {
            username: "al".into(),
            ..ok_clone(&ok)
        };
        let bad_email = RegisterRequest {
            email: "alice".into(),
            ..ok_clone(&ok)
        };

        assert!(ok.validate().is_ok());
        assert!(short_name.validate().is_err());
        assert!(bad_email.validate().is_err());
    }

    fn ok_clone(request: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            username: request.username.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
        }
    }
}
