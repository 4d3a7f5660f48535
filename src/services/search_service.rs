//! Court and game search: geographic radius scans and ranked text search with store fallback.

use std::{cmp::Ordering, collections::HashMap};

use indexmap::IndexMap;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    dao::{
        models::GameFilter,
        search_index::{IndexCollection, SearchIndexError},
    },
    dto::{
        court::{CourtDto, LocationDto},
        game::GameDto,
        search::{
            CourtHit, CourtSearchResponse, DEFAULT_RADIUS_KM, GameHit, GameSearchResponse,
            GeoParams, SearchMethod, SearchQuery,
        },
    },
    error::ServiceError,
    services::geo::{haversine_km, round_km},
    state::SharedState,
};

const INDEX_UNAVAILABLE_MESSAGE: &str = "Search index not available, using database search";
const INDEX_FAILED_MESSAGE: &str = "Search index query failed, using database search";

/// How a search request is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    Geo(GeoParams),
    Text(String),
}

/// Outcome of asking the external index.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IndexAttempt {
    Unconfigured,
    Failed(String),
    Ranked(Vec<i64>),
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn invalid_location(reason: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidInput(format!("Invalid location parameters: {reason}"))
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, ServiceError> {
    value
        .parse::<f64>()
        .map_err(|err| invalid_location(format!("{name}: {err}")))
}

/// Pick the search mode. Both coordinates select a geographic search and `q` is then ignored.
pub fn resolve_mode(query: &SearchQuery) -> Result<SearchMode, ServiceError> {
    if let (Some(lat), Some(lng)) = (present(&query.lat), present(&query.lng)) {
        let lat = parse_coordinate("lat", lat)?;
        let lng = parse_coordinate("lng", lng)?;
        let radius = match present(&query.radius) {
            Some(radius) => parse_coordinate("radius", radius)?,
            None => DEFAULT_RADIUS_KM,
        };

        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid_location("lat must be between -90 and 90"));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid_location("lng must be between -180 and 180"));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(invalid_location("radius must be a non-negative number"));
        }

        return Ok(SearchMode::Geo(GeoParams { lat, lng, radius }));
    }

    match present(&query.q) {
        Some(text) => Ok(SearchMode::Text(text.to_string())),
        None => Err(ServiceError::InvalidInput(
            "Search query is required for text search".into(),
        )),
    }
}

/// Reorder `items` to follow `ranked_ids`, dropping ids with no matching item.
fn order_by_rank<T>(ranked_ids: &[i64], items: Vec<T>, id_of: impl Fn(&T) -> i64) -> Vec<T> {
    let mut slots: IndexMap<i64, Option<T>> = ranked_ids.iter().map(|id| (*id, None)).collect();
    for item in items {
        if let Some(slot) = slots.get_mut(&id_of(&item)) {
            *slot = Some(item);
        }
    }
    slots.into_values().flatten().collect()
}

fn by_distance(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

async fn query_index(
    state: &SharedState,
    collection: IndexCollection,
    text: &str,
) -> IndexAttempt {
    let Some(index) = state.search_index() else {
        return IndexAttempt::Unconfigured;
    };

    let limit = state.search_timeout();
    let outcome = match timeout(limit, index.search(collection, text.to_string())).await {
        Ok(result) => result,
        Err(_) => Err(SearchIndexError::Timeout(limit)),
    };

    match outcome {
        Ok(ids) => {
            debug!(collection = collection.suffix(), hits = ids.len(), "index search");
            IndexAttempt::Ranked(ids)
        }
        Err(err) => {
            warn!(
                collection = collection.suffix(),
                error = %err,
                "search index failed; falling back to store"
            );
            IndexAttempt::Failed(err.to_string())
        }
    }
}

/// Search courts by location or text.
pub async fn search_courts(
    state: &SharedState,
    query: SearchQuery,
) -> Result<CourtSearchResponse, ServiceError> {
    let store = state.store();

    let text = match resolve_mode(&query)? {
        SearchMode::Geo(params) => {
            let mut hits: Vec<(f64, CourtHit)> = store
                .courts_with_coordinates()
                .await?
                .into_iter()
                .filter_map(|court| {
                    let (lat, lng) = court.coordinates()?;
                    let distance = haversine_km(params.lat, params.lng, lat, lng);
                    (distance <= params.radius).then(|| {
                        let hit = CourtHit {
                            court: court.into(),
                            distance: Some(round_km(distance)),
                        };
                        (distance, hit)
                    })
                })
                .collect();
            hits.sort_by(|(da, a), (db, b)| {
                by_distance(*da, *db).then(a.court.court_id.cmp(&b.court.court_id))
            });

            return Ok(CourtSearchResponse {
                courts: hits.into_iter().map(|(_, hit)| hit).collect(),
                search_method: SearchMethod::LocationRadius,
                params: Some(params),
                error: None,
            });
        }
        SearchMode::Text(text) => text,
    };

    let (courts, search_method, error) =
        match query_index(state, IndexCollection::Courts, &text).await {
            IndexAttempt::Ranked(ids) => {
                let courts = store.find_courts(ids.clone()).await?;
                let ordered = order_by_rank(&ids, courts, |court| court.id);
                (ordered, SearchMethod::Elasticsearch, None)
            }
            IndexAttempt::Unconfigured => (
                store.courts_matching_name(text).await?,
                SearchMethod::Database,
                None,
            ),
            IndexAttempt::Failed(error) => (
                store.courts_matching_name(text).await?,
                SearchMethod::Database,
                Some(error),
            ),
        };

    Ok(CourtSearchResponse {
        courts: courts
            .into_iter()
            .map(|court| CourtHit {
                court: CourtDto::from(court),
                distance: None,
            })
            .collect(),
        search_method,
        params: None,
        error,
    })
}

/// Search games by the location of their court or by text.
pub async fn search_games(
    state: &SharedState,
    query: SearchQuery,
) -> Result<GameSearchResponse, ServiceError> {
    let store = state.store();

    let text = match resolve_mode(&query)? {
        SearchMode::Geo(params) => {
            let locations: HashMap<i64, (f64, f64)> = store
                .courts_with_coordinates()
                .await?
                .into_iter()
                .filter_map(|court| court.coordinates().map(|coords| (court.id, coords)))
                .collect();

            let mut hits: Vec<(f64, GameHit)> = store
                .list_games(GameFilter::default())
                .await?
                .iter()
                .filter_map(|record| {
                    let (lat, lng) = *locations.get(&record.game.court_id)?;
                    let distance = haversine_km(params.lat, params.lng, lat, lng);
                    (distance <= params.radius).then(|| {
                        let hit = GameHit {
                            game: GameDto::from(record),
                            distance: Some(round_km(distance)),
                            court_location: Some(LocationDto { lat, lng }),
                        };
                        (distance, hit)
                    })
                })
                .collect();
            hits.sort_by(|(da, a), (db, b)| {
                by_distance(*da, *db).then(a.game.game_id.cmp(&b.game.game_id))
            });

            return Ok(GameSearchResponse {
                games: hits.into_iter().map(|(_, hit)| hit).collect(),
                search_method: SearchMethod::LocationRadius,
                params: Some(params),
                error: None,
                message: None,
            });
        }
        SearchMode::Text(text) => text,
    };

    let (games, search_method, error, message) =
        match query_index(state, IndexCollection::Games, &text).await {
            IndexAttempt::Ranked(ids) => {
                let games = store.find_games(ids.clone()).await?;
                let ordered = order_by_rank(&ids, games, |record| record.game.id);
                (ordered, SearchMethod::Elasticsearch, None, None)
            }
            IndexAttempt::Unconfigured => (
                store.games_matching_text(text).await?,
                SearchMethod::Database,
                None,
                Some(INDEX_UNAVAILABLE_MESSAGE.to_string()),
            ),
            IndexAttempt::Failed(error) => (
                store.games_matching_text(text).await?,
                SearchMethod::Database,
                Some(error),
                Some(INDEX_FAILED_MESSAGE.to_string()),
            ),
        };

    Ok(GameSearchResponse {
        games: games
            .iter()
            .map(|record| GameHit {
                game: GameDto::from(record),
                distance: None,
                court_location: None,
            })
            .collect(),
        search_method,
        params: None,
        error,
        message,
    })
}
