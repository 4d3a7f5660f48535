//! Process-local store used by tests and local development.

use std::{collections::BTreeMap, sync::Arc};

use futures::future::BoxFuture;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::dao::{
    models::{
        ChatMessageEntity, CourtEntity, CourtFilter, GameEntity, GameFilter, GameRecord,
        GameStatus, NewChatMessage, NewCourt, NewGame, NewUser, ParticipantEntity, UserEntity,
    },
    storage::{StorageError, StorageResult},
};
use crate::state::lifecycle::LifecycleError;

use super::{GameMutation, GameUpdateError, Store};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, UserEntity>,
    courts: BTreeMap<i64, CourtEntity>,
    games: BTreeMap<i64, GameRecord>,
    messages: Vec<ChatMessageEntity>,
    next_user_id: i64,
    next_court_id: i64,
    next_game_id: i64,
    next_message_id: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn court_name(&self, court_id: i64) -> Option<&str> {
        self.courts.get(&court_id).map(|court| court.name.as_str())
    }
}

/// [`Store`] keeping every table in memory behind a single async mutex.
///
/// Holding the mutex over load, apply and write gives [`Store::update_game`] the same all-or-nothing
/// behaviour as a database transaction.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| value.to_lowercase().contains(needle))
}

impl Store for MemoryStore {
    fn create_user(&self, user: NewUser) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.lock().await;
            if tables.users.values().any(|u| u.username == user.username) {
                return Err(StorageError::conflict("Username already exists"));
            }
            if tables.users.values().any(|u| u.email == user.email) {
                return Err(StorageError::conflict("Email already exists"));
            }

            let id = next(&mut tables.next_user_id);
            let entity = UserEntity {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                created_at: OffsetDateTime::now_utc(),
            };
            tables.users.insert(id, entity.clone());
            Ok(entity)
        })
    }

    fn find_user(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.lock().await.users.get(&id).cloned()) })
    }

    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            Ok(tables
                .users
                .values()
                .find(|u| u.username == login || u.email == login)
                .cloned())
        })
    }

    fn upsert_court(&self, court: NewCourt) -> BoxFuture<'static, StorageResult<CourtEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.lock().await;
            let now = OffsetDateTime::now_utc();
            let existing = tables
                .courts
                .values()
                .find(|c| c.uuid == court.uuid)
                .map(|c| (c.id, c.created_at));
            let (id, created_at) = match existing {
                Some(found) => found,
                None => (next(&mut tables.next_court_id), now),
            };

            let entity = CourtEntity {
                id,
                uuid: court.uuid,
                place_id: court.place_id,
                name: court.name,
                address: court.address,
                phone: court.phone,
                website: court.website,
                lat: court.lat,
                lng: court.lng,
                rating: court.rating,
                total_ratings: court.total_ratings,
                hours: court.hours,
                photos: court.photos,
                amenities: court.amenities,
                reviews: court.reviews,
                court_type: court.court_type,
                surface_type: court.surface_type,
                number_of_courts: court.number_of_courts,
                created_at,
                updated_at: now,
            };
            tables.courts.insert(id, entity.clone());
            Ok(entity)
        })
    }

    fn find_court(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.lock().await.courts.get(&id).cloned()) })
    }

    fn list_courts(
        &self,
        filter: CourtFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            let name = filter.name.map(|n| n.to_lowercase());
            let mut courts: Vec<_> = tables
                .courts
                .values()
                .filter(|c| name.as_deref().is_none_or(|n| contains_ci(Some(&c.name), n)))
                .filter(|c| {
                    filter
                        .court_type
                        .as_deref()
                        .is_none_or(|t| c.court_type.as_deref() == Some(t))
                })
                .cloned()
                .collect();
            courts.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(courts)
        })
    }

    fn find_courts(&self, ids: Vec<i64>) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            Ok(ids
                .iter()
                .filter_map(|id| tables.courts.get(id).cloned())
                .collect())
        })
    }

    fn courts_with_coordinates(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            Ok(tables
                .courts
                .values()
                .filter(|c| c.coordinates().is_some())
                .cloned()
                .collect())
        })
    }

    fn courts_matching_name(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            let needle = needle.to_lowercase();
            Ok(tables
                .courts
                .values()
                .filter(|c| contains_ci(Some(&c.name), &needle))
                .cloned()
                .collect())
        })
    }

    fn create_game(&self, game: NewGame) -> BoxFuture<'static, StorageResult<GameRecord>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.lock().await;
            if !tables.courts.contains_key(&game.court_id) {
                return Err(StorageError::conflict(format!(
                    "court {} does not exist",
                    game.court_id
                )));
            }

            let id = next(&mut tables.next_game_id);
            let now = OffsetDateTime::now_utc();
            let record = GameRecord {
                game: GameEntity {
                    id,
                    court_id: game.court_id,
                    creator_id: game.creator_id,
                    date: game.date,
                    time: game.time,
                    max_players: game.max_players,
                    skill_level: game.skill_level,
                    status: GameStatus::Scheduled,
                    notes: game.notes,
                    created_at: now,
                    updated_at: now,
                },
                participants: vec![ParticipantEntity {
                    user_id: game.creator_id,
                    joined_at: now,
                }],
            };
            tables.games.insert(id, record.clone());
            Ok(record)
        })
    }

    fn find_game(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.lock().await.games.get(&id).cloned()) })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            let mut games: Vec<_> = tables
                .games
                .values()
                .filter(|r| filter.court_id.is_none_or(|id| r.game.court_id == id))
                .filter(|r| filter.date.is_none_or(|date| r.game.date == date))
                .filter(|r| filter.status.is_none_or(|status| r.game.status == status))
                .cloned()
                .collect();
            games.sort_by_key(|r| (r.game.date, r.game.time, r.game.id));
            Ok(games)
        })
    }

    fn find_games(&self, ids: Vec<i64>) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            Ok(ids
                .iter()
                .filter_map(|id| tables.games.get(id).cloned())
                .collect())
        })
    }

    fn games_matching_text(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            let needle = needle.to_lowercase();
            Ok(tables
                .games
                .values()
                .filter(|r| {
                    contains_ci(r.game.skill_level.as_deref(), &needle)
                        || contains_ci(r.game.notes.as_deref(), &needle)
                        || contains_ci(tables.court_name(r.game.court_id), &needle)
                })
                .cloned()
                .collect())
        })
    }

    fn update_game(
        &self,
        id: i64,
        mutation: GameMutation,
    ) -> BoxFuture<'static, Result<GameRecord, GameUpdateError>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.lock().await;
            let stored = tables
                .games
                .get(&id)
                .ok_or(LifecycleError::GameNotFound(id))?;

            let mut updated = stored.clone();
            mutation(&mut updated)?;
            if stored.game_changed(&updated) {
                updated.game.updated_at = OffsetDateTime::now_utc();
            }

            tables.games.insert(id, updated.clone());
            Ok(updated)
        })
    }

    fn append_message(
        &self,
        message: NewChatMessage,
    ) -> BoxFuture<'static, StorageResult<ChatMessageEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.lock().await;
            if !tables.games.contains_key(&message.game_id) {
                return Err(StorageError::conflict(format!(
                    "game {} does not exist",
                    message.game_id
                )));
            }
            let username = tables
                .users
                .get(&message.user_id)
                .map(|u| u.username.clone())
                .ok_or_else(|| {
                    StorageError::conflict(format!("user {} does not exist", message.user_id))
                })?;

            let entity = ChatMessageEntity {
                id: next(&mut tables.next_message_id),
                game_id: message.game_id,
                user_id: message.user_id,
                username,
                message_text: message.message_text,
                timestamp: OffsetDateTime::now_utc(),
            };
            tables.messages.push(entity.clone());
            Ok(entity)
        })
    }

    fn list_messages(
        &self,
        game_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatMessageEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.lock().await;
            let mut messages: Vec<_> = tables
                .messages
                .iter()
                .filter(|m| m.game_id == game_id)
                .cloned()
                .collect();
            messages.sort_by_key(|m| (m.timestamp, m.id));
            Ok(messages)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, time};

    use super::*;

    fn court(uuid: &str, name: &str) -> NewCourt {
        NewCourt {
            uuid: uuid.into(),
            name: name.into(),
            ..NewCourt::default()
        }
    }

    fn user(name: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "hash".into(),
        }
    }

    fn game(court_id: i64, creator_id: i64) -> NewGame {
        NewGame {
            court_id,
            creator_id,
            date: date!(2025 - 03 - 01),
            time: time!(10:00),
            max_players: 4,
            skill_level: Some("intermediate".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(user("alice")).await.unwrap();

        let err = store.create_user(user("alice")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn login_lookup_matches_username_or_email() {
        let store = MemoryStore::new();
        let alice = store.create_user(user("alice")).await.unwrap();

        let by_name = store.find_user_by_login("alice".into()).await.unwrap();
        let by_email = store
            .find_user_by_login("alice@example.com".into())
            .await
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(alice.id));
        assert_eq!(by_email.map(|u| u.id), Some(alice.id));
    }

    #[tokio::test]
    async fn upsert_keeps_court_id_for_same_uuid() {
        let store = MemoryStore::new();
        let first = store.upsert_court(court("u-1", "Old name")).await.unwrap();
        let second = store.upsert_court(court("u-1", "New name")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "New name");
        assert_eq!(store.list_courts(CourtFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_courts_filters_and_orders_by_name() {
        let store = MemoryStore::new();
        store.upsert_court(court("a", "Zephyr Park")).await.unwrap();
        store.upsert_court(court("b", "Central Park")).await.unwrap();
        store.upsert_court(court("c", "Riverside")).await.unwrap();

        let courts = store
            .list_courts(CourtFilter {
                name: Some("PARK".into()),
                court_type: None,
            })
            .await
            .unwrap();
        let names: Vec<_> = courts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Central Park", "Zephyr Park"]);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_record_untouched() {
        let store = MemoryStore::new();
        let court = store.upsert_court(court("a", "Court")).await.unwrap();
        let created = store.create_game(game(court.id, 1)).await.unwrap();

        let result = store
            .update_game(
                created.game.id,
                Box::new(|record| {
                    record.participants.clear();
                    Err(LifecycleError::GameFull)
                }),
            )
            .await;

        assert!(matches!(
            result,
            Err(GameUpdateError::Rejected(LifecycleError::GameFull))
        ));
        let stored = store.find_game(created.game.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn updating_missing_game_reports_not_found() {
        let store = MemoryStore::new();
        let result = store.update_game(99, Box::new(|_| Ok(()))).await;

        assert!(matches!(
            result,
            Err(GameUpdateError::Rejected(LifecycleError::GameNotFound(99)))
        ));
    }

    #[tokio::test]
    async fn text_match_covers_court_name() {
        let store = MemoryStore::new();
        let court = store.upsert_court(court("a", "Sunset Courts")).await.unwrap();
        let created = store.create_game(game(court.id, 1)).await.unwrap();

        let by_court = store.games_matching_text("sunset".into()).await.unwrap();
        let by_skill = store.games_matching_text("INTERMEDIATE".into()).await.unwrap();
        let none = store.games_matching_text("advanced".into()).await.unwrap();

        assert_eq!(by_court.len(), 1);
        assert_eq!(by_court[0].game.id, created.game.id);
        assert_eq!(by_skill.len(), 1);
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn messages_carry_sender_username() {
        let store = MemoryStore::new();
        let alice = store.create_user(user("alice")).await.unwrap();
        let court = store.upsert_court(court("a", "Court")).await.unwrap();
        let created = store.create_game(game(court.id, alice.id)).await.unwrap();

        store
            .append_message(NewChatMessage {
                game_id: created.game.id,
                user_id: alice.id,
                message_text: "hi".into(),
            })
            .await
            .unwrap();

        let messages = store.list_messages(created.game.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].username, "alice");
    }
}
