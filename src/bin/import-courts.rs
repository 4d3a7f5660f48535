//! Load a courts dataset (`{"courts": [...]}`) into the store and the search index.
//!
//! Usage: `import-courts <path/to/courts.json>`. Store and index settings come from the same
//! configuration file and environment variables as the server.

use std::{env, fs};

use anyhow::{Context, bail};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickleball_back::{
    config::AppConfig,
    dao::{search_index, store},
    dto::court::CourtImportFile,
    services::court_service,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(path) = env::args().nth(1) else {
        bail!("usage: import-courts <courts.json>");
    };
    let contents = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let file: CourtImportFile =
        serde_json::from_str(&contents).with_context(|| format!("parsing {path}"))?;
    info!(path = %path, courts = file.courts.len(), "importing courts");

    let config = AppConfig::load();
    let store = store::connect(&config.storage)
        .await
        .context("connecting to the primary store")?;

    let index = match &config.search {
        Some(search) => match search_index::connect(search) {
            Ok(index) => {
                if let Err(err) = index.ensure_collections().await {
                    warn!(error = %err, "failed to prepare search index collections");
                }
                Some(index)
            }
            Err(err) => {
                warn!(error = %err, "search index unavailable; courts will not be indexed");
                None
            }
        },
        None => None,
    };

    let state = AppState::new(store, index, &config);
    let summary = court_service::import_courts(&state, file)
        .await
        .context("importing courts")?;

    println!(
        "imported {} courts ({} skipped, {} indexed)",
        summary.imported, summary.skipped, summary.indexed
    );
    Ok(())
}
