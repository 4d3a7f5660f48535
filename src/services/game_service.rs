use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::info;
use validator::Validate;

use crate::{
    dao::models::{CourtEntity, GameFilter, GameRecord, GameStatus, NewGame},
    dto::{
        game::{
            CreateGameRequest, CreateGameResponse, DEFAULT_MAX_PLAYERS, GameDto, GameListQuery,
            GameListResponse, GameResponse, JoinGameResponse, MessageResponse,
        },
        validation::{parse_game_date, parse_game_time},
    },
    error::ServiceError,
    services::index_sync,
    state::SharedState,
};

const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD";
const INVALID_TIME: &str = "Invalid time format. Use HH:MM (24-hour format)";

/// Schedule a new game on behalf of `creator_id`, who becomes its first participant.
pub async fn create_game(
    state: &SharedState,
    creator_id: i64,
    request: CreateGameRequest,
) -> Result<CreateGameResponse, ServiceError> {
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    request.validate()?;

    let CreateGameRequest {
        court_id: Some(court_id),
        date: Some(date),
        time: Some(time),
        max_players,
        skill_level,
        notes,
    } = request
    else {
        return Err(ServiceError::Internal(
            "required game fields vanished after validation".into(),
        ));
    };

    let store = state.store();
    let Some(court) = store.find_court(court_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "Court not found with ID: {court_id}"
        )));
    };

    let date =
        parse_game_date(&date).ok_or_else(|| ServiceError::InvalidFormat(INVALID_DATE.into()))?;
    let time =
        parse_game_time(&time).ok_or_else(|| ServiceError::InvalidFormat(INVALID_TIME.into()))?;

    let record = store
        .create_game(NewGame {
            court_id,
            creator_id,
            date,
            time,
            max_players: max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
            skill_level,
            notes,
        })
        .await?;

    info!(
        game_id = record.game.id,
        court_id,
        creator_id,
        "game scheduled"
    );
    index_sync::spawn_game_reindex(state, record.game.id);

    Ok(CreateGameResponse {
        message: "Game scheduled successfully".into(),
        game_id: record.game.id,
        game: GameDto::with_court(&record, Some(court)),
    })
}

/// List games matching the query, each with its court. Status defaults to `scheduled`.
pub async fn list_games(
    state: &SharedState,
    query: GameListQuery,
) -> Result<GameListResponse, ServiceError> {
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .unwrap_or(GameStatus::Scheduled.as_str())
        .parse::<GameStatus>()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let date = match query.date.as_deref().filter(|date| !date.is_empty()) {
        Some(raw) => Some(
            parse_game_date(raw).ok_or_else(|| ServiceError::InvalidInput(INVALID_DATE.into()))?,
        ),
        None => None,
    };

    let records = state
        .store()
        .list_games(GameFilter {
            court_id: query.court_id,
            date,
            status: Some(status),
        })
        .await?;

    let courts = courts_by_id(state, &records).await?;
    let games = records
        .iter()
        .map(|record| GameDto::with_court(record, courts.get(&record.game.court_id).cloned()))
        .collect();

    Ok(GameListResponse { games })
}

/// Fetch one game with its participants and court.
pub async fn get_game(state: &SharedState, game_id: i64) -> Result<GameResponse, ServiceError> {
    let store = state.store();
    let Some(record) = store.find_game(game_id).await? else {
        return Err(ServiceError::NotFound("Game not found".into()));
    };
    let court = store.find_court(record.game.court_id).await?;

    Ok(GameResponse {
        game: GameDto::with_court(&record, court),
    })
}

/// Add `user_id` to the game, under the store's lock on the game.
pub async fn join_game(
    state: &SharedState,
    game_id: i64,
    user_id: i64,
) -> Result<JoinGameResponse, ServiceError> {
    let record = state
        .store()
        .update_game(
            game_id,
            Box::new(move |record| record.join(user_id, OffsetDateTime::now_utc())),
        )
        .await?;

    info!(
        game_id,
        user_id,
        players = record.participant_count(),
        "player joined game"
    );
    index_sync::spawn_game_reindex(state, record.game.id);

    Ok(JoinGameResponse {
        message: "Successfully joined the game".into(),
        game: GameDto::from(&record),
    })
}

/// Remove `user_id` from the game, handing ownership over or cancelling the game as needed.
pub async fn leave_game(
    state: &SharedState,
    game_id: i64,
    user_id: i64,
) -> Result<MessageResponse, ServiceError> {
    let record = state
        .store()
        .update_game(
            game_id,
            Box::new(move |record| record.leave(user_id).map(|_| ())),
        )
        .await?;

    let game = &record.game;
    if game.status == GameStatus::Cancelled {
        info!(game_id, user_id, "last player left; game cancelled");
    } else {
        info!(
            game_id,
            user_id,
            creator_id = game.creator_id,
            "player left game"
        );
    }
    index_sync::spawn_game_reindex(state, record.game.id);

    Ok(MessageResponse::new("Successfully left the game"))
}

async fn courts_by_id(
    state: &SharedState,
    records: &[GameRecord],
) -> Result<HashMap<i64, CourtEntity>, ServiceError> {
    let mut ids: Vec<i64> = records.iter().map(|record| record.game.court_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let courts = state.store().find_courts(ids).await?;
    Ok(courts.into_iter().map(|court| (court.id, court)).collect())
}
