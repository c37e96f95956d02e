//! Page reads for the server-rendered console.
//!
//! Each view drives the matching page controller against the request's
//! cookie session and answers with the page state as JSON. A controller
//! redirect becomes a `303`, and the `error` code left by a failed form
//! action is decoded into a readable `flash` message.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use him_client::pages::{
    BuyersPage, DashboardPage, HelpersPage, PendingHelpersPage, SignupNotice, SupportTicketsPage,
    TaskDetailPage, TasksPage, TicketDetailPage,
};
use him_client::{Mount, PageOutcome};
use him_shared::constants::{COOKIE_LOGIN_DEV_OTP, COOKIE_LOGIN_PHONE};
use him_shared::{describe_error, Route};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::session::RequestSession;

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub error: Option<String>,
    pub status: Option<String>,
    pub step: Option<String>,
    pub success: Option<String>,
}

impl ViewQuery {
    fn flash(&self) -> Option<String> {
        describe_error(self.error.as_deref())
    }
}

#[derive(Serialize)]
struct PageView<T> {
    #[serde(flatten)]
    page: T,
    flash: Option<String>,
}

fn render<T: Serialize>(
    session: RequestSession,
    outcome: PageOutcome<T>,
    query: &ViewQuery,
) -> Response {
    match outcome {
        PageOutcome::Ready(page) => session.finish(Json(PageView {
            page,
            flash: query.flash(),
        })),
        PageOutcome::Redirect(route) => session.redirect(&route.location()),
        // The mount lives as long as the handler, so this only happens if a
        // controller gives up on its own.
        PageOutcome::Cancelled => session.finish(StatusCode::NO_CONTENT),
    }
}

pub async fn dashboard(session: RequestSession, Query(query): Query<ViewQuery>) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = DashboardPage::load(session.store(), &mount).await;
    render(session, outcome, &query)
}

pub async fn buyers(session: RequestSession, Query(query): Query<ViewQuery>) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = BuyersPage::load(session.store(), &mount).await;
    render(session, outcome, &query)
}

pub async fn helpers(session: RequestSession, Query(query): Query<ViewQuery>) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = HelpersPage::load(session.store(), &mount).await;
    render(session, outcome, &query)
}

pub async fn pending_helpers(
    session: RequestSession,
    Query(query): Query<ViewQuery>,
) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = PendingHelpersPage::load(session.store(), &mount).await;
    render(session, outcome, &query)
}

pub async fn tasks(session: RequestSession, Query(query): Query<ViewQuery>) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = TasksPage::load(session.store(), &mount, query.status.as_deref()).await;
    render(session, outcome, &query)
}

pub async fn task_detail(
    session: RequestSession,
    Path(task_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = TaskDetailPage::load(session.store(), &mount, &task_id).await;
    render(session, outcome, &query)
}

pub async fn support_tickets(
    session: RequestSession,
    Query(query): Query<ViewQuery>,
) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome =
        SupportTicketsPage::load(session.store(), &mount, query.status.as_deref()).await;
    render(session, outcome, &query)
}

pub async fn ticket_detail(
    session: RequestSession,
    Path(ticket_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let (mount, _handle) = Mount::new();
    let outcome = TicketDetailPage::load(session.store(), &mount, &ticket_id).await;
    render(session, outcome, &query)
}

// ─── Public pages ───

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginView {
    step: &'static str,
    phone: Option<String>,
    dev_otp: Option<String>,
    flash: Option<String>,
}

/// Login form state. Signed-in admins are sent to the dashboard.
pub async fn login(
    State(state): State<AppState>,
    session: RequestSession,
    Query(query): Query<ViewQuery>,
) -> Response {
    if session.store().is_authenticated() {
        return session.redirect(&Route::Dashboard.location());
    }

    let otp_step = query.step.as_deref() == Some("otp");
    let view = LoginView {
        step: if otp_step { "otp" } else { "phone" },
        phone: session.cookie(COOKIE_LOGIN_PHONE).map(str::to_string),
        dev_otp: session
            .cookie(COOKIE_LOGIN_DEV_OTP)
            .filter(|_| otp_step && state.config.dev_show_otp)
            .map(str::to_string),
        flash: query.flash(),
    };
    session.finish(Json(view))
}

#[derive(Serialize)]
struct SignupView {
    notice: Option<&'static str>,
    flash: Option<String>,
}

pub async fn signup(session: RequestSession, Query(query): Query<ViewQuery>) -> Response {
    let view = SignupView {
        notice: SignupNotice::from_query(query.success.as_deref()).map(|n| n.message()),
        flash: query.flash(),
    };
    session.finish(Json(view))
}
