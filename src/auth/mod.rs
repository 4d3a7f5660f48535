//! Password hashing, access tokens and the authenticated-user extractor.

pub mod jwt;
pub mod password;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{error::AppError, state::SharedState};

pub use jwt::JwtService;
pub use password::PasswordHasher;

/// Failures raised while hashing passwords or handling tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("failed to sign access token")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("password hashing failed")]
    Hash(#[source] bcrypt::BcryptError),
}

/// Identity of the caller, taken from a verified access token.
///
/// The token is read from `Authorization: Bearer <token>`, or from the `access_token` query
/// parameter for clients (such as `EventSource`) that cannot set headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}

fn query_token(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.access_token)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or(AuthError::MissingToken)?;
        let claims = state.jwt().verify(&token)?;
        Ok(AuthUser {
            user_id: claims.user_id()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(uri: &str, authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_is_preferred() {
        let parts = parts("/stream?access_token=query", Some("Bearer header"));
        assert_eq!(
            bearer_token(&parts).or_else(|| query_token(&parts)),
            Some("header".into())
        );
    }

    #[test]
    fn query_parameter_is_a_fallback() {
        let parts = parts("/stream?access_token=query", None);
        assert_eq!(bearer_token(&parts), None);
        assert_eq!(query_token(&parts), Some("query".into()));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let parts = parts("/", Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }
}
