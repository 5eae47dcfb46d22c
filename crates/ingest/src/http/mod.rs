//! HTTP surface over [`ProjectStore`].

mod handlers;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use ingest_store::ProjectStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use handlers::{ARCHIVE_FIELD, ApiError};

/// Build the router. `max_upload_bytes` caps request bodies; `None` lifts
/// axum's default cap so large archives can stream through.
pub fn router(store: ProjectStore, max_upload_bytes: Option<usize>) -> Router {
    let body_limit = match max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(handlers::health))
        .route("/files/projects", get(handlers::list_projects))
        .route("/files/{project}/upload", post(handlers::upload_archive))
        .route("/files/{project}/save", post(handlers::save_files))
        .route("/files/{project}/list", get(handlers::list_files))
        .route("/files/{project}", delete(handlers::delete_project))
        .route("/files/{project}/{filename}", delete(handlers::delete_file))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Serve `app` on `addr` until Ctrl-C.
pub async fn serve(addr: &str, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
