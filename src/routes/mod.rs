use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
};

use crate::{error::AppError, state::SharedState};

pub mod auth;
pub mod chat;
pub mod court;
pub mod docs;
pub mod game;
pub mod health;
pub mod search;

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = Router::<SharedState>::new()
        .merge(auth::router())
        .merge(court::router())
        .merge(game::router())
        .merge(search::router())
        .merge(chat::router());

    Router::<SharedState>::new()
        .nest("/api", api_router)
        .merge(health::router())
        .merge(docs::router())
        .with_state(state)
}
