use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pickleball Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::profile,
        crate::routes::court::list_courts,
        crate::routes::court::get_court,
        crate::routes::game::create_game,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::join_game,
        crate::routes::game::leave_game,
        crate::routes::search::search_courts,
        crate::routes::search::search_games,
        crate::routes::chat::list_messages,
        crate::routes::chat::post_message,
        crate::routes::chat::stream_messages,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::RegisterRequest,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::UserDto,
            crate::dto::auth::RegisterResponse,
            crate::dto::auth::LoginResponse,
            crate::dto::auth::ProfileResponse,
            crate::dto::court::LocationDto,
            crate::dto::court::CourtDto,
            crate::dto::court::CourtListResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::ParticipantDto,
            crate::dto::game::GameDto,
            crate::dto::game::CreateGameResponse,
            crate::dto::game::GameListResponse,
            crate::dto::game::GameResponse,
            crate::dto::game::JoinGameResponse,
            crate::dto::game::MessageResponse,
            crate::dto::search::SearchMethod,
            crate::dto::search::GeoParams,
            crate::dto::search::CourtHit,
            crate::dto::search::GameHit,
            crate::dto::search::CourtSearchResponse,
            crate::dto::search::GameSearchResponse,
            crate::dto::chat::PostMessageRequest,
            crate::dto::chat::ChatMessageDto,
            crate::dto::chat::ChatHistoryResponse,
            crate::dto::chat::PostMessageResponse,
            crate::dao::models::GameStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Accounts and access tokens"),
        (name = "courts", description = "Court catalogue"),
        (name = "games", description = "Game scheduling and participation"),
        (name = "search", description = "Text and location search over courts and games"),
        (name = "chat", description = "Per-game chat for participants"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by authenticated routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_api_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/games/{id}/join"));
        assert!(paths.contains_key("/api/search/courts"));
        assert!(paths.contains_key("/healthcheck"));
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer"));
    }
}
