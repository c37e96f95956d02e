//! In-memory stand-in for the HIM REST backend.
//!
//! Implements the auth and admin endpoints the console calls, records every
//! request it receives, and can be told to fail specific routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use him_shared::constants::endpoints;
use him_shared::protocol::{
    AccountUpdate, AuthTokens, BuyerSignupRequest, NewAccount, OtpStartRequest, OtpStartResponse,
    OtpVerifyRequest, PasswordLoginRequest, RejectRequest, TaskStatusChange, TicketReply,
    TicketStatusChange,
};
use him_shared::types::{
    AccountStatus, AdminSummary, AuthUser, Buyer, Helper, KycStatus, PendingHelper, RecentTask,
    Role, SupportTicket, Task, TaskDetail, TaskStatus, TicketDetail, TicketMessage,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::{spawn_router, TestServer};

/// Phone number that verifies as an admin.
pub const ADMIN_PHONE: &str = "9999999999";
/// The one-time code issued for every OTP start.
pub const DEV_OTP: &str = "123456";
pub const ADMIN_EMAIL: &str = "admin@him.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";
/// A valid non-admin account, for exercising the admin-only gate.
pub const HELPER_EMAIL: &str = "helper@him.test";
pub const HELPER_PASSWORD: &str = "helper-pass";

/// A request as seen by the mock, body decoded as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    path: String,
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct MockState {
    dev_otp: bool,
    next_id: u64,
    otps: HashMap<String, String>,
    sessions: HashMap<String, AuthUser>,
    buyers: Vec<Buyer>,
    helpers: Vec<Helper>,
    pending: Vec<PendingHelper>,
    tasks: Vec<TaskDetail>,
    tickets: Vec<TicketDetail>,
    failures: Vec<Failure>,
    requests: Vec<RecordedRequest>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn issue_tokens(&mut self, user: AuthUser) -> AuthTokens {
        let access = self.next_id("access-");
        let refresh = self.next_id("refresh-");
        self.sessions.insert(access.clone(), user.clone());
        AuthTokens {
            access_token: access,
            refresh_token: refresh,
            user: Some(user),
        }
    }
}

type Reply<T> = Result<T, (StatusCode, String)>;

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

fn bad_request(message: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.to_string())
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// OTP start responses echo the code back as `devOtp`.
    pub fn with_dev_otp() -> Self {
        let state = MockState {
            dev_otp: true,
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn spawn(&self) -> std::io::Result<TestServer> {
        spawn_router(self.router()).await
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(endpoints::OTP_START, post(otp_start))
            .route(endpoints::OTP_VERIFY, post(otp_verify))
            .route(endpoints::PASSWORD_LOGIN, post(password_login))
            .route(endpoints::PASSWORD_SIGNUP, post(password_signup))
            .route(endpoints::HELPER_KYC_SIGNUP, post(helper_kyc_signup))
            .route(endpoints::ADMIN_SUMMARY, get(summary))
            .route(endpoints::ADMIN_RECENT_TASKS, get(recent_tasks))
            .route(endpoints::ADMIN_BUYERS, get(list_buyers).post(create_buyer))
            .route("/api/v1/admin/buyers/:id/update", post(update_buyer))
            .route("/api/v1/admin/buyers/:id/delete", post(delete_buyer))
            .route(endpoints::ADMIN_HELPERS, get(list_helpers).post(create_helper))
            .route("/api/v1/admin/helpers/:id/update", post(update_helper))
            .route("/api/v1/admin/helpers/:id/delete", post(delete_helper))
            .route(endpoints::ADMIN_PENDING_HELPERS, get(pending_helpers))
            .route("/api/v1/admin/helpers/:id/approve", post(approve_helper))
            .route("/api/v1/admin/helpers/:id/reject", post(reject_helper))
            .route("/api/v1/admin/helpers/:id/reopen-kyc", post(reopen_kyc))
            .route("/api/v1/admin/users/:id", delete(delete_user))
            .route(endpoints::ADMIN_TASKS, get(list_tasks))
            .route("/api/v1/admin/tasks/:id", get(task_detail))
            .route("/api/v1/admin/tasks/:id/status", post(set_task_status))
            .route(endpoints::ADMIN_TICKETS, get(list_tickets))
            .route("/api/v1/admin/support/tickets/:id", get(ticket_detail))
            .route(
                "/api/v1/admin/support/tickets/:id/messages",
                post(post_ticket_message),
            )
            .route(
                "/api/v1/admin/support/tickets/:id/status",
                post(set_ticket_status),
            )
            .layer(middleware::from_fn_with_state(
                self.clone(),
                record_and_inject,
            ))
            .with_state(self.clone())
    }

    // -- seeding --

    pub async fn seed_buyer(&self, buyer: Buyer) {
        self.state.lock().await.buyers.push(buyer);
    }

    pub async fn seed_helper(&self, helper: Helper) {
        self.state.lock().await.helpers.push(helper);
    }

    pub async fn seed_pending_helper(&self, pending: PendingHelper) {
        self.state.lock().await.pending.push(pending);
    }

    pub async fn seed_task(&self, task: TaskDetail) {
        self.state.lock().await.tasks.push(task);
    }

    pub async fn seed_ticket(&self, ticket: TicketDetail) {
        self.state.lock().await.tickets.push(ticket);
    }

    /// Mint an access token directly, bypassing the login endpoints.
    pub async fn issue_token(&self, role: Role) -> String {
        let mut state = self.state.lock().await;
        let id = state.next_id("U");
        let user = AuthUser {
            id: Some(id),
            email: None,
            phone: None,
            role: Some(role),
        };
        state.issue_tokens(user).access_token
    }

    /// Invalidate every issued access token, as if they all expired.
    pub async fn revoke_tokens(&self) {
        self.state.lock().await.sessions.clear();
    }

    // -- failure injection --

    /// Answer `method path` with `status` and `body` until cleared.
    pub async fn fail(&self, method: &str, path: &str, status: u16, body: &str) {
        self.respond(method, path, status, body).await;
    }

    /// Serve `body` verbatim for `method path`, bypassing the handler. Used
    /// for payload shapes the typed handlers would never produce.
    pub async fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.state.lock().await.failures.push(Failure {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
        });
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    // -- inspection --

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub async fn buyers(&self) -> Vec<Buyer> {
        self.state.lock().await.buyers.clone()
    }

    pub async fn helpers(&self) -> Vec<Helper> {
        self.state.lock().await.helpers.clone()
    }

    pub async fn pending_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .pending
            .iter()
            .map(|p| p.helper_id.clone())
            .collect()
    }
}

async fn record_and_inject(
    State(backend): State<MockBackend>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: header_str(&parts.headers, header::AUTHORIZATION),
        content_type: header_str(&parts.headers, header::CONTENT_TYPE),
        cache_control: header_str(&parts.headers, header::CACHE_CONTROL),
        body: serde_json::from_slice(&bytes).ok(),
    };

    let injected = {
        let mut state = backend.state.lock().await;
        let injected = state
            .failures
            .iter()
            .find(|f| f.method == recorded.method && f.path == recorded.path)
            .map(|f| (f.status, f.body.clone()));
        state.requests.push(recorded);
        injected
    };

    if let Some((status, body)) = injected {
        return (status, body).into_response();
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn require_admin(backend: &MockBackend, headers: &HeaderMap) -> Reply<AuthUser> {
    let token = header_str(headers, header::AUTHORIZATION)
        .and_then(|v| v.strip_prefix("Bearer ").map(str::to_string))
        .ok_or((StatusCode::UNAUTHORIZED, "missing bearer token".to_string()))?;
    let state = backend.state.lock().await;
    match state.sessions.get(&token) {
        Some(user) if user.is_admin() => Ok(user.clone()),
        Some(_) => Err((StatusCode::FORBIDDEN, "admin only".to_string())),
        None => Err((StatusCode::UNAUTHORIZED, "invalid token".to_string())),
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn otp_start(
    State(backend): State<MockBackend>,
    Json(req): Json<OtpStartRequest>,
) -> Reply<Json<OtpStartResponse>> {
    if req.phone.trim().is_empty() {
        return Err(bad_request("phone is required"));
    }
    let mut state = backend.state.lock().await;
    state.otps.insert(req.phone, DEV_OTP.to_string());
    Ok(Json(OtpStartResponse {
        dev_otp: state.dev_otp.then(|| DEV_OTP.to_string()),
    }))
}

async fn otp_verify(
    State(backend): State<MockBackend>,
    Json(req): Json<OtpVerifyRequest>,
) -> Reply<Json<AuthTokens>> {
    let mut state = backend.state.lock().await;
    if state.otps.get(&req.phone) != Some(&req.otp) {
        return Err((StatusCode::UNAUTHORIZED, "invalid otp".to_string()));
    }
    state.otps.remove(&req.phone);
    let id = state.next_id("U");
    let role = if req.phone == ADMIN_PHONE {
        Role::Admin
    } else {
        Role::Buyer
    };
    let user = AuthUser {
        id: Some(id),
        email: None,
        phone: Some(req.phone),
        role: Some(role),
    };
    Ok(Json(state.issue_tokens(user)))
}

async fn password_login(
    State(backend): State<MockBackend>,
    Json(req): Json<PasswordLoginRequest>,
) -> Reply<Json<AuthTokens>> {
    let role = match (req.email.as_str(), req.password.as_str()) {
        (ADMIN_EMAIL, ADMIN_PASSWORD) => Role::Admin,
        (HELPER_EMAIL, HELPER_PASSWORD) => Role::Helper,
        _ => return Err((StatusCode::UNAUTHORIZED, "invalid credentials".to_string())),
    };
    let mut state = backend.state.lock().await;
    let id = state.next_id("U");
    let user = AuthUser {
        id: Some(id),
        email: Some(req.email),
        phone: None,
        role: Some(role),
    };
    Ok(Json(state.issue_tokens(user)))
}

async fn password_signup(
    State(backend): State<MockBackend>,
    Json(req): Json<BuyerSignupRequest>,
) -> Reply<(StatusCode, Json<AuthTokens>)> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(bad_request("email and password are required"));
    }
    let mut state = backend.state.lock().await;
    let id = state.next_id("B");
    state.buyers.push(Buyer {
        id: id.clone(),
        role: Role::Buyer,
        status: AccountStatus::Active,
        phone: req.phone.clone(),
        email: Some(req.email.clone()),
        display_name: req.display_name,
        created_at: Utc::now(),
    });
    let user = AuthUser {
        id: Some(id),
        email: Some(req.email),
        phone: req.phone,
        role: Some(Role::Buyer),
    };
    Ok((StatusCode::CREATED, Json(state.issue_tokens(user))))
}

async fn helper_kyc_signup(
    State(backend): State<MockBackend>,
    mut multipart: Multipart,
) -> Reply<(StatusCode, Json<AuthTokens>)> {
    let mut text = HashMap::new();
    let mut files = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(&format!("failed to read field: {e}")))?;
        if is_file {
            files.insert(name, data.len());
        } else {
            text.insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    let field = |name: &str| text.get(name).filter(|v| !v.trim().is_empty()).cloned();
    let has_file = |name: &str| files.get(name).is_some_and(|len| *len > 0);
    let (Some(email), Some(_password), Some(full_name), Some(id_number)) = (
        field("email"),
        field("password"),
        field("fullName"),
        field("idNumber"),
    ) else {
        return Err(bad_request("missing required fields"));
    };
    if !(has_file("idFront") && has_file("idBack") && has_file("selfie")) {
        return Err(bad_request("missing KYC documents"));
    }

    let mut state = backend.state.lock().await;
    let id = state.next_id("H");
    let now = Utc::now();
    state.helpers.push(Helper {
        id: id.clone(),
        role: Role::Helper,
        status: AccountStatus::Active,
        phone: field("phone"),
        email: Some(email.clone()),
        display_name: field("displayName"),
        created_at: now,
        helper_kyc_status: Some(KycStatus::Pending),
        helper_kyc_full_name: Some(full_name.clone()),
        helper_kyc_id_number: Some(id_number.clone()),
        helper_kyc_doc_front_url: None,
        helper_kyc_doc_back_url: None,
        helper_kyc_selfie_url: None,
        helper_kyc_submitted_at: Some(now),
    });
    state.pending.push(PendingHelper {
        helper_id: id.clone(),
        phone: field("phone"),
        kyc_status: KycStatus::Pending,
        kyc_full_name: Some(full_name),
        kyc_id_number: Some(id_number),
        kyc_doc_front_url: None,
        kyc_doc_back_url: None,
        kyc_selfie_url: None,
        kyc_submitted_at: Some(now),
        created_at: now,
    });
    let user = AuthUser {
        id: Some(id),
        email: Some(email),
        phone: field("phone"),
        role: Some(Role::Helper),
    };
    Ok((StatusCode::CREATED, Json(state.issue_tokens(user))))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn summary(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Reply<Json<AdminSummary>> {
    require_admin(&backend, &headers).await?;
    let state = backend.state.lock().await;
    let count = |status: TaskStatus| {
        state
            .tasks
            .iter()
            .filter(|t| t.task.status == status)
            .count() as u64
    };
    Ok(Json(AdminSummary {
        pending_helpers: state.pending.len() as u64,
        searching_tasks: count(TaskStatus::Searching),
        assigned_tasks: count(TaskStatus::Assigned),
        arrived_tasks: count(TaskStatus::Arrived),
        started_tasks: count(TaskStatus::Started),
        completed_tasks: count(TaskStatus::Completed),
        total_revenue_paise: state
            .tasks
            .iter()
            .filter(|t| t.task.status == TaskStatus::Completed)
            .map(|t| t.task.budget_paise)
            .sum(),
    }))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn recent_tasks(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(query): Query<LimitQuery>,
) -> Reply<Json<Vec<RecentTask>>> {
    require_admin(&backend, &headers).await?;
    let state = backend.state.lock().await;
    let mut tasks: Vec<RecentTask> = state.tasks.iter().map(|t| (&t.task).into()).collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tasks.truncate(query.limit.unwrap_or(5));
    Ok(Json(tasks))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

fn check_account_status(status: Option<&AccountStatus>) -> Reply<()> {
    match status {
        Some(status) if !status.is_known() => Err(bad_request("invalid status")),
        _ => Ok(()),
    }
}

async fn list_buyers(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Reply<Json<Vec<Buyer>>> {
    require_admin(&backend, &headers).await?;
    Ok(Json(backend.state.lock().await.buyers.clone()))
}

async fn create_buyer(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(req): Json<NewAccount>,
) -> Reply<(StatusCode, Json<Buyer>)> {
    require_admin(&backend, &headers).await?;
    check_account_status(req.status.as_ref())?;
    let mut state = backend.state.lock().await;
    let buyer = Buyer {
        id: state.next_id("B"),
        role: Role::Buyer,
        status: req.status.unwrap_or(AccountStatus::Active),
        phone: req.phone,
        email: req.email,
        display_name: req.display_name,
        created_at: Utc::now(),
    };
    state.buyers.insert(0, buyer.clone());
    Ok((StatusCode::CREATED, Json(buyer)))
}

async fn update_buyer(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<AccountUpdate>,
) -> Reply<Json<Buyer>> {
    require_admin(&backend, &headers).await?;
    check_account_status(req.status.as_ref())?;
    let mut state = backend.state.lock().await;
    let buyer = state
        .buyers
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| not_found("buyer"))?;
    buyer.phone = req.phone;
    buyer.email = req.email;
    buyer.display_name = req.display_name;
    if let Some(status) = req.status {
        buyer.status = status;
    }
    Ok(Json(buyer.clone()))
}

async fn delete_buyer(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<StatusCode> {
    require_admin(&backend, &headers).await?;
    let mut state = backend.state.lock().await;
    let before = state.buyers.len();
    state.buyers.retain(|b| b.id != id);
    if state.buyers.len() == before {
        return Err(not_found("buyer"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_helpers(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Reply<Json<Vec<Helper>>> {
    require_admin(&backend, &headers).await?;
    Ok(Json(backend.state.lock().await.helpers.clone()))
}

async fn create_helper(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(req): Json<NewAccount>,
) -> Reply<(StatusCode, Json<Helper>)> {
    require_admin(&backend, &headers).await?;
    check_account_status(req.status.as_ref())?;
    let mut state = backend.state.lock().await;
    let helper = Helper {
        id: state.next_id("H"),
        role: Role::Helper,
        status: req.status.unwrap_or(AccountStatus::Active),
        phone: req.phone,
        email: req.email,
        display_name: req.display_name,
        created_at: Utc::now(),
        helper_kyc_status: None,
        helper_kyc_full_name: None,
        helper_kyc_id_number: None,
        helper_kyc_doc_front_url: None,
        helper_kyc_doc_back_url: None,
        helper_kyc_selfie_url: None,
        helper_kyc_submitted_at: None,
    };
    state.helpers.insert(0, helper.clone());
    Ok((StatusCode::CREATED, Json(helper)))
}

async fn update_helper(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<AccountUpdate>,
) -> Reply<Json<Helper>> {
    require_admin(&backend, &headers).await?;
    check_account_status(req.status.as_ref())?;
    let mut state = backend.state.lock().await;
    let helper = state
        .helpers
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| not_found("helper"))?;
    helper.phone = req.phone;
    helper.email = req.email;
    helper.display_name = req.display_name;
    if let Some(status) = req.status {
        helper.status = status;
    }
    Ok(Json(helper.clone()))
}

async fn delete_helper(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<StatusCode> {
    require_admin(&backend, &headers).await?;
    let mut state = backend.state.lock().await;
    let before = state.helpers.len();
    state.helpers.retain(|h| h.id != id);
    state.pending.retain(|p| p.helper_id != id);
    if state.helpers.len() == before {
        return Err(not_found("helper"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<StatusCode> {
    require_admin(&backend, &headers).await?;
    let mut state = backend.state.lock().await;
    let before = state.buyers.len() + state.helpers.len() + state.pending.len();
    state.buyers.retain(|b| b.id != id);
    state.helpers.retain(|h| h.id != id);
    state.pending.retain(|p| p.helper_id != id);
    if state.buyers.len() + state.helpers.len() + state.pending.len() == before {
        return Err(not_found("user"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// KYC review
// ---------------------------------------------------------------------------

async fn pending_helpers(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Reply<Json<Vec<PendingHelper>>> {
    require_admin(&backend, &headers).await?;
    Ok(Json(backend.state.lock().await.pending.clone()))
}

fn settle_kyc(state: &mut MockState, id: &str, outcome: KycStatus) -> Reply<Json<serde_json::Value>> {
    let before = state.pending.len();
    state.pending.retain(|p| p.helper_id != id);
    if state.pending.len() == before {
        return Err(not_found("pending helper"));
    }
    if let Some(helper) = state.helpers.iter_mut().find(|h| h.id == id) {
        helper.helper_kyc_status = Some(outcome.clone());
    }
    Ok(Json(json!({ "helperId": id, "kycStatus": outcome })))
}

async fn approve_helper(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<serde_json::Value>> {
    require_admin(&backend, &headers).await?;
    settle_kyc(&mut *backend.state.lock().await, &id, KycStatus::Approved)
}

async fn reject_helper(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Reply<Json<serde_json::Value>> {
    require_admin(&backend, &headers).await?;
    if req.reason.trim().is_empty() {
        return Err(bad_request("reason is required"));
    }
    settle_kyc(&mut *backend.state.lock().await, &id, KycStatus::Rejected)
}

async fn reopen_kyc(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<serde_json::Value>> {
    require_admin(&backend, &headers).await?;
    let mut state = backend.state.lock().await;
    if state.pending.iter().any(|p| p.helper_id == id) {
        return Err((StatusCode::CONFLICT, "kyc already pending".to_string()));
    }
    let helper = state
        .helpers
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| not_found("helper"))?;
    helper.helper_kyc_status = Some(KycStatus::Pending);
    let pending = PendingHelper {
        helper_id: helper.id.clone(),
        phone: helper.phone.clone(),
        kyc_status: KycStatus::Pending,
        kyc_full_name: helper.helper_kyc_full_name.clone(),
        kyc_id_number: helper.helper_kyc_id_number.clone(),
        kyc_doc_front_url: helper.helper_kyc_doc_front_url.clone(),
        kyc_doc_back_url: helper.helper_kyc_doc_back_url.clone(),
        kyc_selfie_url: helper.helper_kyc_selfie_url.clone(),
        kyc_submitted_at: helper.helper_kyc_submitted_at,
        created_at: helper.created_at,
    };
    state.pending.push(pending);
    Ok(Json(json!({ "helperId": id, "kycStatus": KycStatus::Pending })))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

async fn list_tasks(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Reply<Json<Vec<Task>>> {
    require_admin(&backend, &headers).await?;
    let state = backend.state.lock().await;
    let tasks = state
        .tasks
        .iter()
        .filter(|t| {
            query
                .status
                .as_deref()
                .map_or(true, |s| t.task.status.as_str() == s)
        })
        .map(|t| t.task.clone())
        .collect();
    Ok(Json(tasks))
}

async fn task_detail(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<TaskDetail>> {
    require_admin(&backend, &headers).await?;
    let state = backend.state.lock().await;
    state
        .tasks
        .iter()
        .find(|t| t.task.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("task"))
}

async fn set_task_status(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<TaskStatusChange>,
) -> Reply<Json<TaskDetail>> {
    require_admin(&backend, &headers).await?;
    if !req.status.is_known() {
        return Err(bad_request("invalid status"));
    }
    let mut state = backend.state.lock().await;
    let task = state
        .tasks
        .iter_mut()
        .find(|t| t.task.id == id)
        .ok_or_else(|| not_found("task"))?;
    task.task.status = req.status;
    Ok(Json(task.clone()))
}

// ---------------------------------------------------------------------------
// Support
// ---------------------------------------------------------------------------

async fn list_tickets(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Reply<Json<Vec<SupportTicket>>> {
    require_admin(&backend, &headers).await?;
    let state = backend.state.lock().await;
    let tickets = state
        .tickets
        .iter()
        .filter(|t| {
            query
                .status
                .as_deref()
                .map_or(true, |s| t.ticket.status.as_str() == s)
        })
        .map(|t| t.ticket.clone())
        .collect();
    Ok(Json(tickets))
}

async fn ticket_detail(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<TicketDetail>> {
    require_admin(&backend, &headers).await?;
    let state = backend.state.lock().await;
    state
        .tickets
        .iter()
        .find(|t| t.ticket.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("ticket"))
}

async fn post_ticket_message(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<TicketReply>,
) -> Reply<(StatusCode, Json<TicketMessage>)> {
    let admin = require_admin(&backend, &headers).await?;
    if req.message.trim().is_empty() {
        return Err(bad_request("message is required"));
    }
    let mut state = backend.state.lock().await;
    let message_id = state.next_id("M");
    let ticket = state
        .tickets
        .iter_mut()
        .find(|t| t.ticket.id == id)
        .ok_or_else(|| not_found("ticket"))?;
    let message = TicketMessage {
        id: message_id,
        author_type: "ADMIN".to_string(),
        author_user_id: admin.id,
        message: req.message,
        created_at: Utc::now(),
    };
    ticket.ticket.last_message_at = message.created_at;
    ticket.messages.push(message.clone());
    Ok((StatusCode::CREATED, Json(message)))
}

async fn set_ticket_status(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<TicketStatusChange>,
) -> Reply<Json<SupportTicket>> {
    require_admin(&backend, &headers).await?;
    if !req.status.is_known() {
        return Err(bad_request("invalid status"));
    }
    let mut state = backend.state.lock().await;
    let ticket = state
        .tickets
        .iter_mut()
        .find(|t| t.ticket.id == id)
        .ok_or_else(|| not_found("ticket"))?;
    ticket.ticket.status = req.status;
    ticket.ticket.updated_at = Utc::now();
    Ok(Json(ticket.ticket.clone()))
}
