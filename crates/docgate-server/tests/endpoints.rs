use std::sync::Arc;

use docgate_auth::{
    CookieConfig, FixedClock, LinkService, MagicLinkService, MemoryRevocationStorage,
    RevocationStorage, SessionService,
};
use docgate_server::{AppState, PassthroughWatermarker, build_router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

const SECRET: &str = "test-secret";
const NOW_MS: i64 = 1_700_000_000_000;

struct TestContext {
    base: String,
    clock: Arc<FixedClock>,
    store: Arc<MemoryRevocationStorage>,
    session_service: Arc<SessionService>,
    _docs: tempfile::TempDir,
    shutdown: tokio::sync::oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

async fn start_server() -> TestContext {
    let clock = FixedClock::shared(NOW_MS);
    let store = Arc::new(MemoryRevocationStorage::new());
    let docs = tempfile::tempdir().expect("tempdir");

    let session_service = Arc::new(SessionService::new(
        SECRET,
        86_400,
        clock.clone(),
        store.clone(),
    ));
    let state = AppState {
        link_service: Arc::new(LinkService::new(SECRET, clock.clone(), store.clone())),
        session_service: session_service.clone(),
        magic_service: Arc::new(MagicLinkService::new(SECRET, 600, clock.clone())),
        store: store.clone(),
        watermarker: Arc::new(PassthroughWatermarker),
        clock: clock.clone(),
        cookie_config: CookieConfig::default(),
        docs_dir: docs.path().to_path_buf(),
        link_ttl_seconds: 300,
    };
    let app = build_router(state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestContext {
        base: format!("http://{addr}"),
        clock,
        store,
        session_service,
        _docs: docs,
        shutdown: tx,
        handle,
    }
}

impl TestContext {
    fn session_cookie(&self, email: &str, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(ToString::to_string).collect();
        let token = self.session_service.issue(email, &roles).expect("issue");
        format!("dg_session={token}")
    }

    fn write_doc(&self, resource_id: &str, bytes: &[u8]) {
        std::fs::write(self._docs.path().join(format!("{resource_id}.pdf")), bytes)
            .expect("write doc");
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

#[tokio::test]
async fn healthz_works() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/healthz", ctx.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    ctx.stop().await;
}

#[tokio::test]
async fn sign_then_download_round_trip() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();
    ctx.write_doc("doc-42", b"%PDF-1.4 fixture");

    let cookie = ctx.session_cookie("lender@example.com", &["lender"]);
    let resp = client
        .post(format!("{}/api/docs/sign", ctx.base))
        .header("cookie", &cookie)
        .json(&json!({ "resource_id": "doc-42" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/resource/doc-42/download?exp="));

    let resp = client
        .get(format!("{}{url}", ctx.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    assert_eq!(
        resp.headers().get("content-disposition").unwrap(),
        "inline; filename=\"doc-42.pdf\""
    );
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "private, no-store"
    );
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"%PDF-1.4 fixture");

    ctx.stop().await;
}

#[tokio::test]
async fn sign_requires_session_and_resource_id() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();

    // No cookie at all.
    let resp = client
        .post(format!("{}/api/docs/sign", ctx.base))
        .json(&json!({ "resource_id": "doc-42" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Session present but no resource id.
    let cookie = ctx.session_cookie("lender@example.com", &["lender"]);
    let resp = client
        .post(format!("{}/api/docs/sign", ctx.base))
        .header("cookie", &cookie)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "malformed_request");

    ctx.stop().await;
}

#[tokio::test]
async fn download_failure_statuses() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();
    ctx.write_doc("doc-42", b"%PDF-1.4 fixture");

    let cookie = ctx.session_cookie("lender@example.com", &["lender"]);
    let resp = client
        .post(format!("{}/api/docs/sign", ctx.base))
        .header("cookie", &cookie)
        .json(&json!({ "resource_id": "doc-42" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let url = body["url"].as_str().unwrap().to_string();
    let exp = body["expires_at_ms"].as_i64().unwrap();

    // Missing parameters.
    let resp = client
        .get(format!("{}/resource/doc-42/download", ctx.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Tampered signature.
    let resp = client
        .get(format!(
            "{}/resource/doc-42/download?exp={exp}&sig={}",
            ctx.base,
            "0".repeat(64)
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_signature");

    // Document gone from disk.
    std::fs::remove_file(ctx._docs.path().join("doc-42.pdf")).unwrap();
    let resp = client
        .get(format!("{}{url}", ctx.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    ctx.write_doc("doc-42", b"%PDF-1.4 fixture");

    // Past expiry.
    ctx.clock.set_ms(exp + 1);
    let resp = client
        .get(format!("{}{url}", ctx.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 410);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "expired");

    ctx.stop().await;
}

#[tokio::test]
async fn revoked_link_stops_downloading() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();
    ctx.write_doc("doc-42", b"%PDF-1.4 fixture");

    let lender = ctx.session_cookie("lender@example.com", &["lender"]);
    let resp = client
        .post(format!("{}/api/docs/sign", ctx.base))
        .header("cookie", &lender)
        .json(&json!({ "resource_id": "doc-42" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let url = body["url"].as_str().unwrap().to_string();
    let sig = url.split("sig=").nth(1).unwrap().to_string();

    // Works before revocation.
    let resp = client
        .get(format!("{}{url}", ctx.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Admin revokes the signature.
    let admin = ctx.session_cookie("admin@example.com", &["admin"]);
    let resp = client
        .post(format!("{}/api/admin/revocations/signatures", ctx.base))
        .header("cookie", &admin)
        .json(&json!({ "resource_id": "doc-42", "signature": sig }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{}{url}", ctx.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "revoked");

    // Revoking again is idempotent.
    let resp = client
        .post(format!("{}/api/admin/revocations/signatures", ctx.base))
        .header("cookie", &admin)
        .json(&json!({ "resource_id": "doc-42", "signature": sig }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let snapshot = ctx.store.snapshot().await.unwrap();
    assert_eq!(snapshot.signatures.len(), 1);

    ctx.stop().await;
}

#[tokio::test]
async fn admin_endpoints_reject_non_admins() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();

    let lender = ctx.session_cookie("lender@example.com", &["lender"]);
    let resp = client
        .get(format!("{}/api/admin/revocations", ctx.base))
        .header("cookie", &lender)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let admin = ctx.session_cookie("admin@example.com", &["admin"]);
    let resp = client
        .get(format!("{}/api/admin/revocations", ctx.base))
        .header("cookie", &admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    ctx.stop().await;
}

#[tokio::test]
async fn admin_can_mint_sessions() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();

    let admin = ctx.session_cookie("admin@example.com", &["admin"]);
    let resp = client
        .post(format!("{}/api/auth/issue", ctx.base))
        .header("cookie", &admin)
        .json(&json!({ "email": "counsel@example.com", "roles": ["counsel"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("dg_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));

    // Unknown role is rejected.
    let resp = client
        .post(format!("{}/api/auth/issue", ctx.base))
        .header("cookie", &admin)
        .json(&json!({ "email": "x@example.com", "roles": ["viewer"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // The minted cookie authenticates.
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let resp = client
        .get(format!("{}/api/session", ctx.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let claims: Value = resp.json().await.unwrap();
    assert_eq!(claims["sub"], "counsel@example.com");
    assert_eq!(claims["roles"][0], "counsel");

    ctx.stop().await;
}

#[tokio::test]
async fn magic_link_login_flow() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/magic-link", ctx.base))
        .json(&json!({ "email": "lender@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["url"].as_str().unwrap();

    // Pull the token back out of the callback URL.
    let token = url.split("token=").nth(1).unwrap();
    let token = urlencoding::decode(token).unwrap().into_owned();

    let resp = client
        .post(format!("{}/api/auth/callback", ctx.base))
        .json(&json!({ "email": "lender@example.com", "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let resp = client
        .get(format!("{}/api/session", ctx.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let claims: Value = resp.json().await.unwrap();
    assert_eq!(claims["roles"][0], "lender");

    // A stale token no longer redeems.
    ctx.clock.advance_ms(600_001);
    let resp = client
        .post(format!("{}/api/auth/callback", ctx.base))
        .json(&json!({ "email": "lender@example.com", "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 410);

    ctx.stop().await;
}

#[tokio::test]
async fn logout_revokes_and_clears() {
    let ctx = start_server().await;
    let client = reqwest::Client::new();

    let cookie = ctx.session_cookie("lender@example.com", &["lender"]);
    let resp = client
        .get(format!("{}/api/session", ctx.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/api/auth/logout", ctx.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let set_cookie = resp.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    // The old token is dead even if a copy is replayed.
    let resp = client
        .get(format!("{}/api/session", ctx.base))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "revoked");

    ctx.stop().await;
}
