use tracing::{info, warn};

use crate::{
    dao::models::{CourtFilter, NewCourt},
    dto::court::{CourtDto, CourtImportFile, CourtListQuery, CourtListResponse},
    error::ServiceError,
    services::index_sync,
    state::SharedState,
};

/// List courts by optional name substring and court type.
pub async fn list_courts(
    state: &SharedState,
    query: CourtListQuery,
) -> Result<CourtListResponse, ServiceError> {
    let filter = CourtFilter {
        name: query.name.filter(|name| !name.trim().is_empty()),
        court_type: query.court_type.filter(|kind| !kind.trim().is_empty()),
    };

    let courts = state.store().list_courts(filter).await?;
    Ok(CourtListResponse {
        courts: courts.into_iter().map(CourtDto::from).collect(),
    })
}

/// Fetch one court by id.
pub async fn get_court(state: &SharedState, court_id: i64) -> Result<CourtDto, ServiceError> {
    state
        .store()
        .find_court(court_id)
        .await?
        .map(CourtDto::from)
        .ok_or_else(|| ServiceError::NotFound("Court not found".into()))
}

/// Counters reported by [`import_courts`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub indexed: usize,
}

/// Upsert every court of the dataset, then index it when a search index is configured.
///
/// Records without an id or a name are skipped. Index failures are logged and counted out of
/// `indexed` but never abort the import.
pub async fn import_courts(
    state: &SharedState,
    file: CourtImportFile,
) -> Result<ImportSummary, ServiceError> {
    let store = state.store();
    let index = state.search_index();
    let mut summary = ImportSummary::default();

    for record in file.courts {
        if record.id.trim().is_empty() || record.name.trim().is_empty() {
            warn!(uuid = %record.id, "skipping court without id or name");
            summary.skipped += 1;
            continue;
        }

        let court = store.upsert_court(NewCourt::from(record)).await?;
        summary.imported += 1;

        if let Some(index) = index.as_deref() {
            match index_sync::index_court(index, &court).await {
                Ok(()) => summary.indexed += 1,
                Err(err) => warn!(court_id = court.id, error = %err, "failed to index court"),
            }
        }
    }

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        indexed = summary.indexed,
        "court import finished"
    );
    Ok(summary)
}
