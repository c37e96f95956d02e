use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use him_net::ApiClient;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::session::RequestSession;
use crate::{actions, auth, views};

/// Upper bound for request bodies; KYC signups carry three photos.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let api = ApiClient::new(config.api.clone());
        Self {
            config: Arc::new(config),
            api,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // -- auth --
        .route("/login", get(views::login))
        .route("/login/otp/start", post(auth::start_otp))
        .route("/login/otp/verify", post(auth::verify_otp))
        .route("/login/password", post(auth::password_login))
        .route("/logout", post(auth::logout))
        .route("/signup", get(views::signup))
        .route("/signup/buyer", post(auth::signup_buyer))
        .route("/signup/helper", post(auth::signup_helper))
        // -- pages and form actions --
        .route("/", get(views::dashboard))
        .route("/buyers", get(views::buyers))
        .route("/buyers/create", post(actions::create_buyer))
        .route("/buyers/update", post(actions::update_buyer))
        .route("/buyers/delete", post(actions::delete_buyer))
        .route("/helpers", get(views::helpers))
        .route("/helpers/create", post(actions::create_helper))
        .route("/helpers/update", post(actions::update_helper))
        .route("/helpers/delete", post(actions::delete_helper))
        .route("/helpers/reopen-kyc", post(actions::reopen_kyc))
        .route("/helpers/pending", get(views::pending_helpers))
        .route("/helpers/pending/approve", post(actions::approve_helper))
        .route("/helpers/pending/reject", post(actions::reject_helper))
        .route("/tasks", get(views::tasks))
        .route("/tasks/:task_id", get(views::task_detail))
        .route("/tasks/:task_id/status", post(actions::set_task_status))
        .route("/support/tickets", get(views::support_tickets))
        .route("/support/tickets/:ticket_id", get(views::ticket_detail))
        .route(
            "/support/tickets/:ticket_id/messages",
            post(actions::reply_to_ticket),
        )
        .route(
            "/support/tickets/:ticket_id/status",
            post(actions::set_ticket_status),
        )
        // -- JSON endpoints used by the helper grids --
        .route("/api/admin/helpers/delete", post(api_delete_helper))
        .route("/api/admin/helpers/approve", post(api_approve_helper))
        .route("/api/admin/helpers/reject", post(api_reject_helper))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Grid JSON endpoints ───

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HelperActionRequest {
    #[serde(default)]
    helper_id: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

/// Trimmed helper id of an authorized request.
fn helper_id<'a>(
    session: &RequestSession,
    req: &'a HelperActionRequest,
) -> Result<&'a str, ServerError> {
    session.guard().map_err(|_| ServerError::Unauthorized)?;
    let helper_id = req.helper_id.trim();
    if helper_id.is_empty() {
        return Err(ServerError::BadRequest("helperId is required".into()));
    }
    Ok(helper_id)
}

/// Delete the helper's user account outright.
async fn api_delete_helper(
    session: RequestSession,
    Json(req): Json<HelperActionRequest>,
) -> Result<Response, ServerError> {
    let helper_id = helper_id(&session, &req)?;
    session.store().admin().delete_user(helper_id).await?;
    info!(helper_id, "helper deleted via grid");
    Ok(Json(OkResponse { ok: true }).into_response())
}

async fn api_approve_helper(
    session: RequestSession,
    Json(req): Json<HelperActionRequest>,
) -> Result<Response, ServerError> {
    let helper_id = helper_id(&session, &req)?;
    session.store().admin().approve_helper(helper_id).await?;
    info!(helper_id, "helper approved via grid");
    Ok(Json(OkResponse { ok: true }).into_response())
}

async fn api_reject_helper(
    session: RequestSession,
    Json(req): Json<HelperActionRequest>,
) -> Result<Response, ServerError> {
    let helper_id = helper_id(&session, &req)?;
    session
        .store()
        .admin()
        .reject_helper(helper_id, req.reason.as_deref())
        .await?;
    info!(helper_id, "helper rejected via grid");
    Ok(Json(OkResponse { ok: true }).into_response())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use him_testkit::{fixtures, MockBackend};
    use tower::ServiceExt;

    use crate::testing::{admin_cookie, app, get, json_body, json_post};

    #[tokio::test]
    async fn test_health() {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;

        let response = router.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_json_actions_require_session() {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;

        for path in [
            "/api/admin/helpers/delete",
            "/api/admin/helpers/approve",
            "/api/admin/helpers/reject",
        ] {
            let response = router
                .clone()
                .oneshot(json_post(path, r#"{"helperId":"H1"}"#, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(json_body(response).await["error"], "Unauthorized");
        }
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_json_delete_maps_to_user_delete() {
        let mock = MockBackend::new();
        mock.seed_helper(fixtures::helper("H1")).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(json_post(
                "/api/admin/helpers/delete",
                r#"{"helperId":"H1"}"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["ok"], true);

        let sent = mock.requests_to("/api/v1/admin/users/H1").await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "DELETE");
        assert!(mock.helpers().await.is_empty());
    }

    #[tokio::test]
    async fn test_json_delete_accepts_plain_text_confirmation() {
        let mock = MockBackend::new();
        mock.respond("DELETE", "/api/v1/admin/users/H1", 200, "OK")
            .await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(json_post(
                "/api/admin/helpers/delete",
                r#"{"helperId":"H1"}"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["ok"], true);
    }

    #[tokio::test]
    async fn test_json_action_passes_backend_failure_through() {
        let mock = MockBackend::new();
        mock.fail("POST", "/api/v1/admin/helpers/H9/approve", 500, "kyc service down")
            .await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(json_post(
                "/api/admin/helpers/approve",
                r#"{"helperId":"H9"}"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "kyc service down");
    }

    #[tokio::test]
    async fn test_json_action_requires_helper_id() {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(json_post(
                "/api/admin/helpers/reject",
                r#"{"helperId":"  "}"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
