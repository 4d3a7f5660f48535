use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{CourtEntity, GameRecord, GameStatus, ParticipantEntity},
    dto::{court::CourtDto, format_date, format_time, format_timestamp},
};

/// Default capacity of a game when the creator does not pick one.
pub const DEFAULT_MAX_PLAYERS: i32 = 4;

/// Payload used to schedule a new game.
///
/// `court_id`, `date` and `time` are optional at the type level so that missing fields can be
/// reported together instead of as a deserialisation failure.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Court hosting the game.
    pub court_id: Option<i64>,
    /// Calendar date, `YYYY-MM-DD`.
    #[schema(example = "2025-03-01")]
    pub date: Option<String>,
    /// Local start time, `HH:MM` (24-hour clock).
    #[schema(example = "10:00")]
    pub time: Option<String>,
    /// Capacity, 1 to 100. Defaults to 4.
    #[validate(range(min = 1, max = 100, message = "max_players must be between 1 and 100"))]
    pub max_players: Option<i32>,
    /// Free-form level label, such as "3.5".
    #[validate(length(max = 20, message = "skill_level must be at most 20 characters"))]
    pub skill_level: Option<String>,
    /// Free-form notes for players.
    pub notes: Option<String>,
}

impl CreateGameRequest {
    /// Names of the required fields absent from the payload, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.court_id.is_none() {
            missing.push("court_id");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        missing
    }
}

/// Filters accepted by `GET /api/games`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameListQuery {
    /// Restrict to one court.
    pub court_id: Option<i64>,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Defaults to `scheduled`.
    pub status: Option<String>,
}

/// One participant of a game.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantDto {
    /// Participating account.
    pub user_id: i64,
    /// Join time, RFC 3339.
    pub joined_at: String,
}

impl From<&ParticipantEntity> for ParticipantDto {
    fn from(participant: &ParticipantEntity) -> Self {
        Self {
            user_id: participant.user_id,
            joined_at: format_timestamp(participant.joined_at),
        }
    }
}

/// Game as exposed by the API.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameDto {
    /// Game identifier.
    pub game_id: i64,
    /// Hosting court.
    pub court_id: i64,
    /// Current owner; always a participant while the game has any.
    pub creator_id: i64,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Start time, `HH:MM:SS`.
    pub time: String,
    /// `<date>T<time>`.
    pub scheduled_time: String,
    /// Capacity.
    pub max_players: i32,
    /// Number of participants.
    pub current_players: usize,
    #[serialize_always]
    pub skill_level: Option<String>,
    /// Lifecycle status.
    pub status: GameStatus,
    #[serialize_always]
    pub notes: Option<String>,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Last change of the game row, RFC 3339.
    pub updated_at: String,
    /// Ordered by join time.
    pub participants: Vec<ParticipantDto>,
    /// Same list as `participants`, kept for existing clients.
    pub players: Vec<ParticipantDto>,
    /// Included by the list and detail endpoints.
    pub court: Option<CourtDto>,
}

impl GameDto {
    /// Game view with its court attached.
    pub fn with_court(record: &GameRecord, court: Option<CourtEntity>) -> Self {
        let mut dto = Self::from(record);
        dto.court = court.map(Into::into);
        dto
    }
}

impl From<&GameRecord> for GameDto {
    fn from(record: &GameRecord) -> Self {
        let game = &record.game;
        let participants: Vec<ParticipantDto> =
            record.participants.iter().map(Into::into).collect();
        let date = format_date(game.date);
        let time = format_time(game.time);

        Self {
            game_id: game.id,
            court_id: game.court_id,
            creator_id: game.creator_id,
            scheduled_time: format!("{date}T{time}"),
            date,
            time,
            max_players: game.max_players,
            current_players: participants.len(),
            skill_level: game.skill_level.clone(),
            status: game.status,
            notes: game.notes.clone(),
            created_at: format_timestamp(game.created_at),
            updated_at: format_timestamp(game.updated_at),
            players: participants.clone(),
            participants,
            court: None,
        }
    }
}

/// Answer to a scheduled game.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateGameResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Identifier of the new game.
    pub game_id: i64,
    /// The new game with its court.
    pub game: GameDto,
}

/// Games matching a list query.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListResponse {
    /// Matching games ordered by date and time.
    pub games: Vec<GameDto>,
}

/// One game by id.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameResponse {
    /// The requested game with participants and court.
    pub game: GameDto,
}

/// Answer to a successful join.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinGameResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The game after the join.
    pub game: GameDto,
}

/// Plain acknowledgement carrying a human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};

    use super::*;
    use crate::dao::models::GameEntity;

    #[test]
    fn missing_fields_are_listed_in_order() {
        let request = CreateGameRequest {
            court_id: Some(5),
            ..CreateGameRequest::default()
        };
        assert_eq!(request.missing_fields(), vec!["date", "time"]);
    }

    #[test]
    fn max_players_range_is_validated() {
        let too_many = CreateGameRequest {
            max_players: Some(101),
            ..CreateGameRequest::default()
        };
        let zero = CreateGameRequest {
            max_players: Some(0),
            ..CreateGameRequest::default()
        };
        let ok = CreateGameRequest {
            max_players: Some(8),
            ..CreateGameRequest::default()
        };
        assert!(too_many.validate().is_err());
        assert!(zero.validate().is_err());
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn serialised_game_carries_schedule_and_player_alias() {
        let at = datetime!(2025-02-01 09:00 UTC);
        let record = GameRecord {
            game: GameEntity {
                id: 1,
                court_id: 5,
                creator_id: 7,
                date: date!(2025 - 03 - 01),
                time: time!(10:00),
                max_players: 4,
                skill_level: None,
                status: GameStatus::Scheduled,
                notes: None,
                created_at: at,
                updated_at: at,
            },
            participants: vec![ParticipantEntity {
                user_id: 7,
                joined_at: at,
            }],
        };

        let body = serde_json::to_value(GameDto::from(&record)).unwrap();
        assert_eq!(body["scheduled_time"], "2025-03-01T10:00:00");
        assert_eq!(body["status"], "scheduled");
        assert_eq!(body["participants"], body["players"]);
        assert_eq!(body["current_players"], 1);
        assert!(body["skill_level"].is_null());
        assert!(body.get("court").is_none());
    }
}
