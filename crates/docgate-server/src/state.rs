//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use docgate_auth::{
    AuthState, Clock, CookieConfig, LinkService, MagicLinkService, RevocationStorage,
    SessionService,
};

use crate::watermark::Watermarker;

/// Everything the handlers need, shared behind cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub session_service: Arc<SessionService>,
    pub magic_service: Arc<MagicLinkService>,
    pub store: Arc<dyn RevocationStorage>,
    pub watermarker: Arc<dyn Watermarker>,
    pub clock: Arc<dyn Clock>,
    pub cookie_config: CookieConfig,
    pub docs_dir: PathBuf,
    pub link_ttl_seconds: u64,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        AuthState::new(state.session_service.clone(), state.cookie_config.clone())
    }
}
