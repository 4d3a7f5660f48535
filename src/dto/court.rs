use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::dao::models::{CourtEntity, NewCourt};

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Court as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourtDto {
    /// Court identifier.
    pub court_id: i64,
    /// Identifier of the court in the imported dataset.
    pub uuid: String,
    /// Maps provider place identifier.
    pub place_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Postal address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Venue website.
    pub website: Option<String>,
    /// Present only when both coordinates are known.
    pub location: Option<LocationDto>,
    /// Average user rating.
    pub rating: Option<f64>,
    /// Number of ratings behind `rating`.
    pub total_ratings: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub hours: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub photos: Option<Value>,
    /// Court type tag, as given by the dataset.
    pub court_type: Option<String>,
    /// Playing surface.
    pub surface_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub amenities: Option<Value>,
    /// Courts available at the venue.
    pub number_of_courts: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub reviews: Option<Value>,
}

impl From<CourtEntity> for CourtDto {
    fn from(court: CourtEntity) -> Self {
        let location = court.coordinates().map(|(lat, lng)| LocationDto { lat, lng });
        Self {
            court_id: court.id,
            uuid: court.uuid,
            place_id: court.place_id,
            name: court.name,
            address: court.address,
            phone: court.phone,
            website: court.website,
            location,
            rating: court.rating,
            total_ratings: court.total_ratings,
            hours: court.hours,
            photos: court.photos,
            court_type: court.court_type,
            surface_type: court.surface_type,
            amenities: court.amenities,
            number_of_courts: court.number_of_courts,
            reviews: court.reviews,
        }
    }
}

/// Filters accepted by `GET /api/courts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourtListQuery {
    /// Case-insensitive substring of the court name.
    pub name: Option<String>,
    /// Exact court type.
    pub court_type: Option<String>,
}

/// Courts matching a list query.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourtListResponse {
    /// Matching courts ordered by name.
    pub courts: Vec<CourtDto>,
}

/// Top-level document read by the court import tool.
#[derive(Debug, Deserialize)]
pub struct CourtImportFile {
    #[serde(default)]
    pub courts: Vec<CourtImportRecord>,
}

/// One court of the external dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtImportRecord {
    /// Dataset identifier, stored as the court `uuid`.
    pub id: String,
    pub place_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: Option<ImportLocation>,
    pub rating: Option<f64>,
    pub total_ratings: Option<i32>,
    pub hours: Option<Value>,
    pub photos: Option<Value>,
    pub court_type: Option<String>,
    pub surface_type: Option<String>,
    pub amenities: Option<Value>,
    pub number_of_courts: Option<i32>,
    pub reviews: Option<Value>,
}

/// Coordinates as found in the dataset; either may be missing.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImportLocation {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Empty JSON containers carry no information and are stored as absent.
fn non_empty(value: Option<Value>) -> Option<Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::String(text) => !text.is_empty(),
        _ => true,
    })
}

impl From<CourtImportRecord> for NewCourt {
    fn from(record: CourtImportRecord) -> Self {
        let location = record.location;
        Self {
            uuid: record.id,
            place_id: record.place_id,
            name: record.name,
            address: record.address,
            phone: record.phone,
            website: record.website,
            lat: location.and_then(|l| l.lat),
            lng: location.and_then(|l| l.lng),
            rating: record.rating,
            total_ratings: record.total_ratings,
            hours: non_empty(record.hours),
            photos: non_empty(record.photos),
            amenities: non_empty(record.amenities),
            reviews: non_empty(record.reviews),
            court_type: record.court_type,
            surface_type: record.surface_type,
            number_of_courts: record.number_of_courts,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::OffsetDateTime;

    use super::*;

    fn entity(lat: Option<f64>, lng: Option<f64>) -> CourtEntity {
        let now = OffsetDateTime::UNIX_EPOCH;
        CourtEntity {
            id: 5,
            uuid: "u-5".into(),
            place_id: None,
            name: "Central".into(),
            address: None,
            phone: None,
            website: None,
            lat,
            lng,
            rating: None,
            total_ratings: None,
            hours: None,
            photos: None,
            amenities: Some(json!(["lights"])),
            reviews: None,
            court_type: None,
            surface_type: None,
            number_of_courts: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn location_requires_both_coordinates() {
        let full = CourtDto::from(entity(Some(40.7), Some(-74.0)));
        let partial = CourtDto::from(entity(Some(40.7), None));

        assert_eq!(full.location, Some(LocationDto { lat: 40.7, lng: -74.0 }));
        let body = serde_json::to_value(&partial).unwrap();
        assert!(body["location"].is_null());
        assert_eq!(body["amenities"], json!(["lights"]));
    }

    #[test]
    fn import_record_maps_camel_case_fields() {
        let record: CourtImportRecord = serde_json::from_value(json!({
            "id": "abc-123",
            "placeId": "place",
            "name": "Riverside",
            "location": { "lat": 40.71, "lng": -74.0 },
            "totalRatings": 12,
            "courtType": "outdoor",
            "numberOfCourts": 4,
            "amenities": [],
            "hours": { "mon": "8-20" }
        }))
        .unwrap();

        let court = NewCourt::from(record);
        assert_eq!(court.uuid, "abc-123");
        assert_eq!(court.place_id.as_deref(), Some("place"));
        assert_eq!(court.lat, Some(40.71));
        assert_eq!(court.total_ratings, Some(12));
        assert_eq!(court.number_of_courts, Some(4));
        assert_eq!(court.amenities, None);
        assert!(court.hours.is_some());
    }
}
