use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};

use crate::dto::{
    court::{CourtDto, LocationDto},
    game::GameDto,
};

/// Radius applied to geographic searches when the client does not send one, in km.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Query string of both search endpoints.
///
/// Numbers are kept as text so that parse failures can be reported with the search-specific
/// message instead of a generic query rejection.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free text, required unless both `lat` and `lng` are given.
    pub q: Option<String>,
    /// Latitude in decimal degrees.
    pub lat: Option<String>,
    /// Longitude in decimal degrees.
    pub lng: Option<String>,
    /// Kilometres, defaults to 10.
    pub radius: Option<String>,
}

/// Strategy that produced a search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    LocationRadius,
    Elasticsearch,
    Database,
}

/// Geographic parameters echoed back by location searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoParams {
    /// Latitude of the search centre.
    pub lat: f64,
    /// Longitude of the search centre.
    pub lng: f64,
    /// Radius in kilometres.
    pub radius: f64,
}

/// Court hit; `distance` is set by location searches only.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourtHit {
    #[serde(flatten)]
    pub court: CourtDto,
    /// Kilometres, rounded to two decimals.
    pub distance: Option<f64>,
}

/// Game hit; location searches add the distance and the court coordinates.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameHit {
    #[serde(flatten)]
    pub game: GameDto,
    /// Kilometres, rounded to two decimals.
    pub distance: Option<f64>,
    /// Coordinates of the hosting court, location searches only.
    pub court_location: Option<LocationDto>,
}

/// Result of a court search.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct CourtSearchResponse {
    /// Hits in rank or distance order.
    pub courts: Vec<CourtHit>,
    /// Strategy that answered.
    pub search_method: SearchMethod,
    /// Echo of the geographic parameters, location searches only.
    pub params: Option<GeoParams>,
    /// Index failure that caused the fallback, if any.
    pub error: Option<String>,
}

/// Result of a game search.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSearchResponse {
    /// Hits in rank or distance order.
    pub games: Vec<GameHit>,
    /// Strategy that answered.
    pub search_method: SearchMethod,
    /// Echo of the geographic parameters, location searches only.
    pub params: Option<GeoParams>,
    /// Index failure that caused the fallback, if any.
    pub error: Option<String>,
    /// Explains why the store answered instead of the index.
    pub message: Option<String>,
}
