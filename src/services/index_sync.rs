//! Keep the external search index in step with the primary store.
//!
//! Writes to the index are best effort: the store stays authoritative and a failed write is only
//! logged, never reported to the caller.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    dao::{
        models::{CourtEntity, GameRecord},
        search_index::{IndexCollection, SearchIndex, SearchIndexResult},
    },
    dto::{format_date, format_time},
    state::SharedState,
};

/// Document stored in the courts collection.
pub fn court_document(court: &CourtEntity) -> Value {
    json!({
        "court_id": court.id,
        "uuid": court.uuid,
        "name": court.name,
        "address": court.address,
        "court_type": court.court_type,
        "surface_type": court.surface_type,
        "amenities": court.amenities,
        "rating": court.rating,
        "number_of_courts": court.number_of_courts,
    })
}

/// Document stored in the games collection; `court_name` makes games findable by venue.
pub fn game_document(record: &GameRecord, court_name: Option<&str>) -> Value {
    let game = &record.game;
    json!({
        "game_id": game.id,
        "court_id": game.court_id,
        "court_name": court_name,
        "date": format_date(game.date),
        "time": format_time(game.time),
        "skill_level": game.skill_level,
        "status": game.status,
        "notes": game.notes,
        "max_players": game.max_players,
        "current_players": record.participant_count(),
    })
}

/// Write one court document.
pub async fn index_court(
    index: &dyn SearchIndex,
    court: &CourtEntity,
) -> SearchIndexResult<()> {
    index
        .index_document(IndexCollection::Courts, court.id, court_document(court))
        .await
}

/// Re-index a game in the background once its new state has been committed.
///
/// The game is read back from the store and writes are serialized, so the last write carries the
/// latest committed state.
pub fn spawn_game_reindex(state: &SharedState, game_id: i64) {
    if state.search_index().is_none() {
        return;
    }

    let state = state.clone();
    tokio::spawn(async move {
        let _guard = state.game_index_writes().lock().await;
        reindex_game(&state, game_id).await;
    });
}

async fn reindex_game(state: &SharedState, game_id: i64) {
    let Some(index) = state.search_index() else {
        return;
    };
    let store = state.store();
    let limit = state.search_timeout();

    let record = match store.find_game(game_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!(game_id, "game vanished before re-indexing");
            return;
        }
        Err(err) => {
            warn!(game_id, error = %err, "game lookup failed while re-indexing");
            return;
        }
    };

    let court_name = match store.find_court(record.game.court_id).await {
        Ok(court) => court.map(|court| court.name),
        Err(err) => {
            warn!(game_id, error = %err, "court lookup failed while re-indexing game");
            None
        }
    };

    let document = game_document(&record, court_name.as_deref());
    let write = index.index_document(IndexCollection::Games, game_id, document);
    match tokio::time::timeout(limit, write).await {
        Ok(Ok(())) => debug!(game_id, "game re-indexed"),
        Ok(Err(err)) => warn!(game_id, error = %err, "failed to re-index game"),
        Err(_) => warn!(game_id, timeout = ?limit, "game re-index timed out"),
    }
}
