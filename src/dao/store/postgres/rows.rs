use serde_json::Value;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};

use crate::dao::{
    models::{ChatMessageEntity, CourtEntity, GameEntity, ParticipantEntity, UserEntity},
    storage::StorageError,
};

pub const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

pub const COURT_COLUMNS: &str = "id, uuid, place_id, name, address, phone, website, lat, lng, \
     rating, total_ratings, hours, photos, amenities, reviews, court_type, surface_type, \
     number_of_courts, created_at, updated_at";

pub const GAME_COLUMNS: &str = "id, court_id, creator_id, date, time, max_players, skill_level, \
     status, notes, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserEntity {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct CourtRow {
    id: i64,
    uuid: String,
    place_id: Option<String>,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    rating: Option<f64>,
    total_ratings: Option<i32>,
    hours: Option<Value>,
    photos: Option<Value>,
    amenities: Option<Value>,
    reviews: Option<Value>,
    court_type: Option<String>,
    surface_type: Option<String>,
    number_of_courts: Option<i32>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CourtRow> for CourtEntity {
    fn from(row: CourtRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            place_id: row.place_id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            website: row.website,
            lat: row.lat,
            lng: row.lng,
            rating: row.rating,
            total_ratings: row.total_ratings,
            hours: row.hours,
            photos: row.photos,
            amenities: row.amenities,
            reviews: row.reviews,
            court_type: row.court_type,
            surface_type: row.surface_type,
            number_of_courts: row.number_of_courts,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct GameRow {
    id: i64,
    court_id: i64,
    creator_id: i64,
    date: Date,
    time: Time,
    max_players: i32,
    skill_level: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl GameRow {
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl TryFrom<GameRow> for GameEntity {
    type Error = StorageError;

    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|err| StorageError::corrupt(format!("game {}: {err}", row.id)))?;

        Ok(Self {
            id: row.id,
            court_id: row.court_id,
            creator_id: row.creator_id,
            date: row.date,
            time: row.time,
            max_players: row.max_players,
            skill_level: row.skill_level,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ParticipantRow {
    pub game_id: i64,
    user_id: i64,
    joined_at: OffsetDateTime,
}

impl From<ParticipantRow> for ParticipantEntity {
    fn from(row: ParticipantRow) -> Self {
        Self {
            user_id: row.user_id,
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ChatMessageRow {
    id: i64,
    game_id: i64,
    user_id: i64,
    username: String,
    message_text: String,
    sent_at: OffsetDateTime,
}

impl From<ChatMessageRow> for ChatMessageEntity {
    fn from(row: ChatMessageRow) -> Self {
        Self {
            id: row.id,
            game_id: row.game_id,
            user_id: row.user_id,
            username: row.username,
            message_text: row.message_text,
            timestamp: row.sent_at,
        }
    }
}

/// Escape `needle` for use inside an `ILIKE '%...%'` pattern.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("park"), "%park%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
