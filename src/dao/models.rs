use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime, Time};
use utoipa::ToSchema;

/// Registered account as persisted by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never serialised to clients.
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Account payload accepted by [`crate::dao::store::Store::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Court loaded from the external courts dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtEntity {
    /// Store-assigned identifier.
    pub id: i64,
    /// Identifier of the source record; unique across all courts.
    pub uuid: String,
    pub place_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub total_ratings: Option<i32>,
    /// Opaque JSON blobs, passed through unmodified.
    pub hours: Option<Value>,
    pub photos: Option<Value>,
    pub amenities: Option<Value>,
    pub reviews: Option<Value>,
    pub court_type: Option<String>,
    pub surface_type: Option<String>,
    pub number_of_courts: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl CourtEntity {
    /// Both coordinates, when the court has been geolocated.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

/// Court payload upserted by the import process (keyed by `uuid`).
#[derive(Debug, Clone, Default)]
pub struct NewCourt {
    pub uuid: String,
    pub place_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub total_ratings: Option<i32>,
    pub hours: Option<Value>,
    pub photos: Option<Value>,
    pub amenities: Option<Value>,
    pub reviews: Option<Value>,
    pub court_type: Option<String>,
    pub surface_type: Option<String>,
    pub number_of_courts: Option<i32>,
}

/// Filters accepted when listing courts.
#[derive(Debug, Clone, Default)]
pub struct CourtFilter {
    /// Case-insensitive substring of the court name.
    pub name: Option<String>,
    /// Exact court type tag.
    pub court_type: Option<String>,
}

/// Scheduling status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Cancelled => "cancelled",
            GameStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a persisted or user-supplied status string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for GameStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "scheduled" => Ok(GameStatus::Scheduled),
            "cancelled" => Ok(GameStatus::Cancelled),
            "completed" => Ok(GameStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Scalar columns of a game row.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntity {
    pub id: i64,
    pub court_id: i64,
    pub creator_id: i64,
    pub date: Date,
    pub time: Time,
    pub max_players: i32,
    pub skill_level: Option<String>,
    pub status: GameStatus,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Membership of a user in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantEntity {
    pub user_id: i64,
    pub joined_at: OffsetDateTime,
}

/// A game together with its participants, ordered by (`joined_at`, `user_id`).
///
/// This is the unit the lifecycle transitions operate on; see [`crate::state::lifecycle`].
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub game: GameEntity,
    pub participants: Vec<ParticipantEntity>,
}

/// Game payload accepted by [`crate::dao::store::Store::create_game`].
#[derive(Debug, Clone)]
pub struct NewGame {
    pub court_id: i64,
    pub creator_id: i64,
    pub date: Date,
    pub time: Time,
    pub max_players: i32,
    pub skill_level: Option<String>,
    pub notes: Option<String>,
}

/// Filters accepted when listing games. `None` fields do not constrain the result.
#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    pub court_id: Option<i64>,
    pub date: Option<Date>,
    pub status: Option<GameStatus>,
}

/// Persisted chat message joined with its sender's username.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessageEntity {
    pub id: i64,
    pub game_id: i64,
    pub user_id: i64,
    pub username: String,
    pub message_text: String,
    pub timestamp: OffsetDateTime,
}

/// Chat message payload accepted by [`crate::dao::store::Store::append_message`].
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub game_id: i64,
    pub user_id: i64,
    pub message_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [
            GameStatus::Scheduled,
            GameStatus::Cancelled,
            GameStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<GameStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "pending".parse::<GameStatus>(),
            Err(UnknownStatus("pending".into()))
        );
        assert!("Scheduled".parse::<GameStatus>().is_err());
    }
}
