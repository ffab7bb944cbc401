//! Router construction and server loop.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use docgate_auth::{
    FileRevocationStorage, LinkService, MagicLinkService, SessionService, SystemClock,
};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;
use crate::watermark::PassthroughWatermarker;

/// Builds the application router from configuration.
pub fn build_app(config: &AppConfig) -> Router {
    let clock = Arc::new(SystemClock);
    let store = Arc::new(FileRevocationStorage::new(&config.storage.revocation_file));

    let link_service = Arc::new(LinkService::new(
        config.auth.secret.clone(),
        clock.clone(),
        store.clone(),
    ));
    let session_service = Arc::new(SessionService::new(
        config.auth.secret.clone(),
        config.auth.session_ttl_seconds,
        clock.clone(),
        store.clone(),
    ));
    let magic_service = Arc::new(MagicLinkService::new(
        config.auth.secret.clone(),
        config.auth.magic_link_ttl_seconds,
        clock.clone(),
    ));

    let state = AppState {
        link_service,
        session_service,
        magic_service,
        store,
        watermarker: Arc::new(PassthroughWatermarker),
        clock,
        cookie_config: config.auth.cookie.clone(),
        docs_dir: config.storage.docs_dir.clone(),
        link_ttl_seconds: config.auth.link_ttl_seconds,
    };

    build_router(state)
}

/// Builds the router around pre-assembled state. Tests inject their own
/// clock, store and watermarker through this.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/docs/sign", post(handlers::sign_doc))
        .route(
            "/resource/{resource_id}/download",
            get(handlers::download_doc),
        )
        .route("/api/auth/issue", post(handlers::issue_session))
        .route("/api/auth/magic-link", post(handlers::magic_link))
        .route("/api/auth/callback", post(handlers::callback))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/session", get(handlers::session_info))
        .route(
            "/api/admin/revocations/signatures",
            post(handlers::revoke_signature),
        )
        .route(
            "/api/admin/revocations/sessions",
            post(handlers::revoke_session),
        )
        .route("/api/admin/revocations", get(handlers::list_revocations))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until shutdown.
pub async fn run(config: AppConfig) -> Result<(), std::io::Error> {
    let addr = config.addr();
    let app = build_app(&config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "docgate server listening");

    axum::serve(listener, app).await
}
