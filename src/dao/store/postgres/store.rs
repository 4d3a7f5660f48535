use std::{collections::HashMap, time::Duration};

use futures::future::BoxFuture;
use sqlx::{
    PgConnection, PgPool, Postgres, QueryBuilder,
    postgres::PgPoolOptions,
};
use tracing::info;

use crate::{
    config::StorageConfig,
    dao::{
        models::{
            ChatMessageEntity, CourtEntity, CourtFilter, GameEntity, GameFilter, GameRecord,
            NewChatMessage, NewCourt, NewGame, NewUser, ParticipantEntity, UserEntity,
        },
        storage::{StorageError, StorageResult},
        store::{GameMutation, GameUpdateError, Store},
    },
    state::lifecycle::LifecycleError,
};

use super::{
    error::{PgDaoError, PgResult, query_failed},
    rows::{
        COURT_COLUMNS, ChatMessageRow, CourtRow, GAME_COLUMNS, GameRow, ParticipantRow,
        USER_COLUMNS, UserRow, contains_pattern,
    },
};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// [`Store`] backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open the pool and bring the schema up to date.
    pub async fn connect(config: &StorageConfig) -> PgResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&config.database_url)
            .await
            .map_err(|source| PgDaoError::Connect { source })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|source| PgDaoError::Migrate { source })?;

        info!(
            max_connections = config.max_connections,
            "connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    async fn insert_user(&self, user: NewUser) -> StorageResult<UserEntity> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(query_failed("insert user"));

        match result {
            Ok(row) => Ok(row.into()),
            Err(err) if err.is_unique_violation() => {
                let message = match err.constraint() {
                    Some(name) if name.contains("email") => "Email already exists",
                    _ => "Username already exists",
                };
                Err(StorageError::conflict(message))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_courts(&self, sql: &str, operation: &'static str) -> PgResult<Vec<CourtEntity>> {
        let rows = sqlx::query_as::<_, CourtRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed(operation))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_game(&self, game: NewGame) -> StorageResult<GameRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_failed("begin create game"))?;

        let sql = format!(
            "INSERT INTO games (court_id, creator_id, date, time, max_players, skill_level, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {GAME_COLUMNS}"
        );
        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(game.court_id)
            .bind(game.creator_id)
            .bind(game.date)
            .bind(game.time)
            .bind(game.max_players)
            .bind(&game.skill_level)
            .bind(&game.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(query_failed("insert game"))?;
        let entity = GameEntity::try_from(row)?;

        sqlx::query("INSERT INTO game_participants (game_id, user_id, joined_at) VALUES ($1, $2, $3)")
            .bind(entity.id)
            .bind(entity.creator_id)
            .bind(entity.created_at)
            .execute(&mut *tx)
            .await
            .map_err(query_failed("insert creator participant"))?;

        tx.commit().await.map_err(query_failed("commit create game"))?;

        let participants = vec![ParticipantEntity {
            user_id: entity.creator_id,
            joined_at: entity.created_at,
        }];
        Ok(GameRecord {
            game: entity,
            participants,
        })
    }

    async fn fetch_games(
        &self,
        mut query: QueryBuilder<'_, Postgres>,
        operation: &'static str,
    ) -> StorageResult<Vec<GameRecord>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(query_failed(operation))?;
        let rows = query
            .build_query_as::<GameRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(query_failed(operation))?;
        attach_participants(&mut conn, rows).await
    }

    async fn apply_mutation(
        &self,
        id: i64,
        mutation: GameMutation,
    ) -> Result<GameRecord, GameUpdateError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_failed("begin update game"))
            .map_err(StorageError::from)?;

        let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_failed("lock game"))
            .map_err(StorageError::from)?;
        let Some(row) = row else {
            return Err(LifecycleError::GameNotFound(id).into());
        };

        let mut loaded = attach_participants(&mut tx, vec![row]).await?;
        let Some(before) = loaded.pop() else {
            return Err(LifecycleError::GameNotFound(id).into());
        };

        let mut after = before.clone();
        mutation(&mut after)?;

        let diff = before.participant_diff(&after);
        for user_id in &diff.removed {
            sqlx::query("DELETE FROM game_participants WHERE game_id = $1 AND user_id = $2")
                .bind(id)
                .bind(*user_id)
                .execute(&mut *tx)
                .await
                .map_err(query_failed("delete participant"))
                .map_err(StorageError::from)?;
        }
        for participant in &diff.added {
            let inserted = sqlx::query(
                "INSERT INTO game_participants (game_id, user_id, joined_at) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(participant.user_id)
            .bind(participant.joined_at)
            .execute(&mut *tx)
            .await
            .map_err(query_failed("insert participant"));

            match inserted {
                Ok(_) => {}
                Err(err) if err.is_unique_violation() => {
                    return Err(LifecycleError::AlreadyJoined.into());
                }
                Err(err) => return Err(StorageError::from(err).into()),
            }
        }

        if before.game_changed(&after) {
            let updated_at: time::OffsetDateTime = sqlx::query_scalar(
                "UPDATE games SET creator_id = $2, status = $3, updated_at = now() \
                 WHERE id = $1 RETURNING updated_at",
            )
            .bind(id)
            .bind(after.game.creator_id)
            .bind(after.game.status.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(query_failed("update game"))
            .map_err(StorageError::from)?;
            after.game.updated_at = updated_at;
        }

        tx.commit()
            .await
            .map_err(query_failed("commit update game"))
            .map_err(StorageError::from)?;
        Ok(after)
    }
}

/// Load the participants of every game in `rows` and assemble the records, keeping row order.
async fn attach_participants(
    conn: &mut PgConnection,
    rows: Vec<GameRow>,
) -> StorageResult<Vec<GameRecord>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(GameRow::id).collect();
    let participant_rows = sqlx::query_as::<_, ParticipantRow>(
        "SELECT game_id, user_id, joined_at FROM game_participants \
         WHERE game_id = ANY($1) ORDER BY joined_at, user_id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(query_failed("load participants"))?;

    let mut by_game: HashMap<i64, Vec<ParticipantEntity>> = HashMap::new();
    for row in participant_rows {
        by_game.entry(row.game_id).or_default().push(row.into());
    }

    rows.into_iter()
        .map(|row| {
            let game = GameEntity::try_from(row)?;
            let participants = by_game.remove(&game.id).unwrap_or_default();
            Ok(GameRecord { game, participants })
        })
        .collect()
}

fn games_query<'a>() -> QueryBuilder<'a, Postgres> {
    QueryBuilder::new(format!("SELECT {GAME_COLUMNS} FROM games WHERE 1=1"))
}

impl Store for PgStore {
    fn create_user(&self, user: NewUser) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await })
    }

    fn find_user(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
            let row = sqlx::query_as::<_, UserRow>(&sql)
                .bind(id)
                .fetch_optional(&store.pool)
                .await
                .map_err(query_failed("find user"))?;
            Ok(row.map(Into::into))
        })
    }

    fn find_user_by_login(
        &self,
        login: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 \
                 ORDER BY id LIMIT 1"
            );
            let row = sqlx::query_as::<_, UserRow>(&sql)
                .bind(&login)
                .fetch_optional(&store.pool)
                .await
                .map_err(query_failed("find user by login"))?;
            Ok(row.map(Into::into))
        })
    }

    fn upsert_court(&self, court: NewCourt) -> BoxFuture<'static, StorageResult<CourtEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO courts (uuid, place_id, name, address, phone, website, lat, lng, \
                 rating, total_ratings, hours, photos, amenities, reviews, court_type, \
                 surface_type, number_of_courts) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
                 ON CONFLICT (uuid) DO UPDATE SET \
                 place_id = EXCLUDED.place_id, name = EXCLUDED.name, address = EXCLUDED.address, \
                 phone = EXCLUDED.phone, website = EXCLUDED.website, lat = EXCLUDED.lat, \
                 lng = EXCLUDED.lng, rating = EXCLUDED.rating, \
                 total_ratings = EXCLUDED.total_ratings, hours = EXCLUDED.hours, \
                 photos = EXCLUDED.photos, amenities = EXCLUDED.amenities, \
                 reviews = EXCLUDED.reviews, court_type = EXCLUDED.court_type, \
                 surface_type = EXCLUDED.surface_type, \
                 number_of_courts = EXCLUDED.number_of_courts, updated_at = now() \
                 RETURNING {COURT_COLUMNS}"
            );
            let row = sqlx::query_as::<_, CourtRow>(&sql)
                .bind(&court.uuid)
                .bind(&court.place_id)
                .bind(&court.name)
                .bind(&court.address)
                .bind(&court.phone)
                .bind(&court.website)
                .bind(court.lat)
                .bind(court.lng)
                .bind(court.rating)
                .bind(court.total_ratings)
                .bind(&court.hours)
                .bind(&court.photos)
                .bind(&court.amenities)
                .bind(&court.reviews)
                .bind(&court.court_type)
                .bind(&court.surface_type)
                .bind(court.number_of_courts)
                .fetch_one(&store.pool)
                .await
                .map_err(query_failed("upsert court"))?;
            Ok(row.into())
        })
    }

    fn find_court(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!("SELECT {COURT_COLUMNS} FROM courts WHERE id = $1");
            let row = sqlx::query_as::<_, CourtRow>(&sql)
                .bind(id)
                .fetch_optional(&store.pool)
                .await
                .map_err(query_failed("find court"))?;
            Ok(row.map(Into::into))
        })
    }

    fn list_courts(
        &self,
        filter: CourtFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query =
                QueryBuilder::<Postgres>::new(format!("SELECT {COURT_COLUMNS} FROM courts WHERE 1=1"));
            if let Some(name) = &filter.name {
                query.push(" AND name ILIKE ");
                query.push_bind(contains_pattern(name));
            }
            if let Some(court_type) = &filter.court_type {
                query.push(" AND court_type = ");
                query.push_bind(court_type.clone());
            }
            query.push(" ORDER BY name, id");

            let rows = query
                .build_query_as::<CourtRow>()
                .fetch_all(&store.pool)
                .await
                .map_err(query_failed("list courts"))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn find_courts(&self, ids: Vec<i64>) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!("SELECT {COURT_COLUMNS} FROM courts WHERE id = ANY($1)");
            let rows = sqlx::query_as::<_, CourtRow>(&sql)
                .bind(&ids)
                .fetch_all(&store.pool)
                .await
                .map_err(query_failed("find courts"))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn courts_with_coordinates(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {COURT_COLUMNS} FROM courts \
                 WHERE lat IS NOT NULL AND lng IS NOT NULL ORDER BY id"
            );
            Ok(store.fetch_courts(&sql, "courts with coordinates").await?)
        })
    }

    fn courts_matching_name(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let sql = format!("SELECT {COURT_COLUMNS} FROM courts WHERE name ILIKE $1 ORDER BY id");
            let rows = sqlx::query_as::<_, CourtRow>(&sql)
                .bind(contains_pattern(&needle))
                .fetch_all(&store.pool)
                .await
                .map_err(query_failed("courts matching name"))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn create_game(&self, game: NewGame) -> BoxFuture<'static, StorageResult<GameRecord>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await })
    }

    fn find_game(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = games_query();
            query.push(" AND id = ");
            query.push_bind(id);
            let mut games = store.fetch_games(query, "find game").await?;
            Ok(games.pop())
        })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = games_query();
            if let Some(court_id) = filter.court_id {
                query.push(" AND court_id = ");
                query.push_bind(court_id);
            }
            if let Some(date) = filter.date {
                query.push(" AND date = ");
                query.push_bind(date);
            }
            if let Some(status) = filter.status {
                query.push(" AND status = ");
                query.push_bind(status.as_str());
            }
            query.push(" ORDER BY date, time, id");
            store.fetch_games(query, "list games").await
        })
    }

    fn find_games(&self, ids: Vec<i64>) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = games_query();
            query.push(" AND id = ANY(");
            query.push_bind(ids);
            query.push(")");
            store.fetch_games(query, "find games").await
        })
    }

    fn games_matching_text(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            let pattern = contains_pattern(&needle);
            let mut query = games_query();
            query.push(" AND (skill_level ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR notes ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR court_id IN (SELECT id FROM courts WHERE name ILIKE ");
            query.push_bind(pattern);
            query.push(")) ORDER BY id");
            store.fetch_games(query, "games matching text").await
        })
    }

    fn update_game(
        &self,
        id: i64,
        mutation: GameMutation,
    ) -> BoxFuture<'static, Result<GameRecord, GameUpdateError>> {
        let store = self.clone();
        Box::pin(async move { store.apply_mutation(id, mutation).await })
    }

    fn append_message(
        &self,
        message: NewChatMessage,
    ) -> BoxFuture<'static, StorageResult<ChatMessageEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let row = sqlx::query_as::<_, ChatMessageRow>(
                "WITH inserted AS ( \
                     INSERT INTO chat_messages (game_id, user_id, message_text) \
                     VALUES ($1, $2, $3) \
                     RETURNING id, game_id, user_id, message_text, sent_at \
                 ) \
                 SELECT i.id, i.game_id, i.user_id, u.username, i.message_text, i.sent_at \
                 FROM inserted i JOIN users u ON u.id = i.user_id",
            )
            .bind(message.game_id)
            .bind(message.user_id)
            .bind(&message.message_text)
            .fetch_one(&store.pool)
            .await
            .map_err(query_failed("append chat message"))?;
            Ok(row.into())
        })
    }

    fn list_messages(
        &self,
        game_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatMessageEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = sqlx::query_as::<_, ChatMessageRow>(
                "SELECT m.id, m.game_id, m.user_id, u.username, m.message_text, m.sent_at \
                 FROM chat_messages m JOIN users u ON u.id = m.user_id \
                 WHERE m.game_id = $1 ORDER BY m.sent_at, m.id",
            )
            .bind(game_id)
            .fetch_all(&store.pool)
            .await
            .map_err(query_failed("list chat messages"))?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _: i32 = sqlx::query_scalar("SELECT 1")
                .fetch_one(&store.pool)
                .await
                .map_err(query_failed("health check"))?;
            Ok(())
        })
    }
}
