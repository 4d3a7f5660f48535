//! Pickleball Back binary entrypoint wiring the REST API, chat SSE, store and search index.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickleball_back::{
    config::{AppConfig, SearchIndexConfig},
    dao::{
        search_index::{self, SearchIndex},
        store,
    },
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let store = store::connect(&config.storage)
        .await
        .context("connecting to the primary store")?;
    let search_index = match &config.search {
        Some(search) => connect_search_index(search).await,
        None => {
            info!("no search index configured; text search will use the store");
            None
        }
    };

    let app_state = AppState::new(store, search_index, &config);
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the index client and create missing collections.
///
/// An unreachable index is kept: requests fall back to the store until it answers again.
async fn connect_search_index(config: &SearchIndexConfig) -> Option<Arc<dyn SearchIndex>> {
    let index = match search_index::connect(config) {
        Ok(index) => index,
        Err(err) => {
            warn!(error = %err, "search index client could not be built; disabling index");
            return None;
        }
    };

    let bound = config.timeout().max(Duration::from_secs(5));
    match tokio::time::timeout(bound, index.ensure_collections()).await {
        Ok(Ok(())) => info!(url = %config.url, prefix = %config.index, "search index ready"),
        Ok(Err(err)) => warn!(error = %err, "failed to prepare search index collections"),
        Err(_) => warn!(timeout = ?bound, "search index did not answer during startup"),
    }

    Some(index)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
