//! HTTP handlers.

mod admin;
mod auth;
mod docs;

pub use admin::{list_revocations, revoke_session, revoke_signature};
pub use auth::{callback, issue_session, logout, magic_link, session_info};
pub use docs::{download_doc, sign_doc};

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
