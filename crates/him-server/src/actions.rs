//! Form actions for the server-rendered console.
//!
//! Each action checks the session, forwards one admin call, and redirects
//! back to the page it came from. A failed call appends
//! `error=<action>_failed_<status>` so the page can explain what happened.

use axum::extract::Path;
use axum::response::Response;
use axum::Form;
use him_net::ApiResult;
use him_shared::protocol::{AccountUpdate, NewAccount};
use him_shared::types::{TaskStatus, TicketStatus};
use him_shared::{ErrorCode, MutationAction, Route};
use serde::Deserialize;
use tracing::{info, warn};

use crate::session::RequestSession;

/// Buyer and helper grid forms. Only the id matching the grid is read.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountForm {
    pub buyer_id: String,
    pub helper_id: String,
    pub phone: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub status: String,
}

impl AccountForm {
    fn new_account(&self) -> NewAccount {
        NewAccount::from_form(
            &self.phone,
            &self.email,
            &self.display_name,
            &self.password,
            &self.status,
        )
    }

    fn update(&self) -> AccountUpdate {
        AccountUpdate::from_form(&self.phone, &self.email, &self.display_name, &self.status)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewForm {
    pub helper_id: String,
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplyForm {
    pub message: String,
}

/// Redirect to `route`, or to it with an error code if `result` failed.
fn settle<T>(
    session: RequestSession,
    result: ApiResult<T>,
    route: Route,
    action: MutationAction,
) -> Response {
    match result {
        Ok(_) => session.redirect(&route.location()),
        Err(e) => {
            warn!(
                action = action.as_str(),
                status = e.status(),
                error = %e,
                "admin action failed"
            );
            session.redirect(&route.with_error(&ErrorCode::mutation(action, e.status())))
        }
    }
}

macro_rules! require_session {
    ($session:ident) => {
        if let Err(route) = $session.guard() {
            return $session.redirect(&route.location());
        }
    };
}

// ─── Buyers ───

pub async fn create_buyer(session: RequestSession, Form(form): Form<AccountForm>) -> Response {
    require_session!(session);
    let result = session.store().admin().create_buyer(&form.new_account()).await;
    settle(session, result, Route::Buyers, MutationAction::Create)
}

pub async fn update_buyer(session: RequestSession, Form(form): Form<AccountForm>) -> Response {
    require_session!(session);
    let id = form.buyer_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::Buyers.location());
    }
    let result = session.store().admin().update_buyer(id, &form.update()).await;
    settle(session, result, Route::Buyers, MutationAction::Update)
}

pub async fn delete_buyer(session: RequestSession, Form(form): Form<AccountForm>) -> Response {
    require_session!(session);
    let id = form.buyer_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::Buyers.location());
    }
    let result = session.store().admin().delete_buyer(id).await;
    if result.is_ok() {
        info!(buyer_id = id, "buyer deleted");
    }
    settle(session, result, Route::Buyers, MutationAction::Delete)
}

// ─── Helpers ───

pub async fn create_helper(session: RequestSession, Form(form): Form<AccountForm>) -> Response {
    require_session!(session);
    let result = session.store().admin().create_helper(&form.new_account()).await;
    settle(session, result, Route::Helpers, MutationAction::Create)
}

pub async fn update_helper(session: RequestSession, Form(form): Form<AccountForm>) -> Response {
    require_session!(session);
    let id = form.helper_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::Helpers.location());
    }
    let result = session.store().admin().update_helper(id, &form.update()).await;
    settle(session, result, Route::Helpers, MutationAction::Update)
}

pub async fn delete_helper(session: RequestSession, Form(form): Form<AccountForm>) -> Response {
    require_session!(session);
    let id = form.helper_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::Helpers.location());
    }
    let result = session.store().admin().delete_helper(id).await;
    settle(session, result, Route::Helpers, MutationAction::Delete)
}

pub async fn reopen_kyc(session: RequestSession, Form(form): Form<ReviewForm>) -> Response {
    require_session!(session);
    let id = form.helper_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::Helpers.location());
    }
    let result = session.store().admin().reopen_kyc(id).await;
    settle(session, result, Route::Helpers, MutationAction::Reopen)
}

// ─── KYC review ───

pub async fn approve_helper(session: RequestSession, Form(form): Form<ReviewForm>) -> Response {
    require_session!(session);
    let id = form.helper_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::PendingHelpers.location());
    }
    let result = session.store().admin().approve_helper(id).await;
    settle(session, result, Route::PendingHelpers, MutationAction::Approve)
}

pub async fn reject_helper(session: RequestSession, Form(form): Form<ReviewForm>) -> Response {
    require_session!(session);
    let id = form.helper_id.trim();
    if id.is_empty() {
        return session.redirect(&Route::PendingHelpers.location());
    }
    let result = session
        .store()
        .admin()
        .reject_helper(id, Some(form.reason.as_str()))
        .await;
    settle(session, result, Route::PendingHelpers, MutationAction::Reject)
}

// ─── Tasks and tickets ───

pub async fn set_task_status(
    session: RequestSession,
    Path(task_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    require_session!(session);
    let route = Route::task(task_id.trim());
    let Some(status) = TaskStatus::from_input(&form.status) else {
        return session.redirect(&route.location());
    };
    let result = session
        .store()
        .admin()
        .set_task_status(task_id.trim(), &status)
        .await;
    settle(session, result, route, MutationAction::Status)
}

pub async fn reply_to_ticket(
    session: RequestSession,
    Path(ticket_id): Path<String>,
    Form(form): Form<ReplyForm>,
) -> Response {
    require_session!(session);
    let route = Route::ticket(ticket_id.trim());
    let message = form.message.trim();
    if message.is_empty() {
        return session.redirect(&route.location());
    }
    let result = session
        .store()
        .admin()
        .post_reply(ticket_id.trim(), message)
        .await;
    settle(session, result, route, MutationAction::Message)
}

pub async fn set_ticket_status(
    session: RequestSession,
    Path(ticket_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    require_session!(session);
    let route = Route::ticket(ticket_id.trim());
    let Some(status) = TicketStatus::from_input(&form.status) else {
        return session.redirect(&route.location());
    };
    let result = session
        .store()
        .admin()
        .set_ticket_status(ticket_id.trim(), &status)
        .await;
    settle(session, result, route, MutationAction::Status)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use him_shared::types::{AccountStatus, TaskStatus, TicketStatus};
    use him_testkit::{fixtures, MockBackend};
    use rstest::rstest;
    use tower::ServiceExt;

    use crate::testing::{admin_cookie, app, form_post, location};

    #[rstest]
    #[case("/buyers/create")]
    #[case("/helpers/delete")]
    #[case("/helpers/pending/approve")]
    #[case("/tasks/T1/status")]
    #[case("/support/tickets/S1/messages")]
    #[tokio::test]
    async fn test_actions_redirect_to_login_without_cookie(#[case] path: &str) {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;

        let response = router
            .oneshot(form_post(path, "helperId=H1&status=COMPLETED&message=hi", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_buyer_sends_blank_fields_as_null() {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(form_post(
                "/buyers/create",
                "phone=8000000001&email=&displayName=Asha&password=&status=",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/buyers");

        let sent = mock.requests_to("/api/v1/admin/buyers").await;
        let body = sent[0].body.clone().unwrap();
        assert_eq!(body["phone"], "8000000001");
        assert!(body["email"].is_null());
        assert!(body["status"].is_null());
        assert_eq!(mock.buyers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_buyer_applies_status() {
        let mock = MockBackend::new();
        mock.seed_buyer(fixtures::buyer("B1")).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(form_post(
                "/buyers/update",
                "buyerId=B1&displayName=Renamed&status=blocked",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/buyers");

        let buyers = mock.buyers().await;
        assert_eq!(buyers[0].display_name.as_deref(), Some("Renamed"));
        assert_eq!(buyers[0].status, AccountStatus::Blocked);
    }

    #[tokio::test]
    async fn test_blank_id_skips_backend() {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(form_post("/helpers/update", "helperId=+", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/helpers");
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_carries_error_code() {
        let mock = MockBackend::new();
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(form_post("/buyers/delete", "buyerId=B404", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/buyers?error=delete_failed_404");
    }

    #[tokio::test]
    async fn test_reopen_kyc_conflict() {
        let mock = MockBackend::new();
        mock.seed_helper(fixtures::helper("H1")).await;
        mock.seed_pending_helper(fixtures::pending_helper("H1")).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .oneshot(form_post("/helpers/reopen-kyc", "helperId=H1", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/helpers?error=reopen_failed_409");
    }

    #[tokio::test]
    async fn test_approve_and_reject_pending_helpers() {
        let mock = MockBackend::new();
        mock.seed_pending_helper(fixtures::pending_helper("H1")).await;
        mock.seed_pending_helper(fixtures::pending_helper("H2")).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .clone()
            .oneshot(form_post(
                "/helpers/pending/approve",
                "helperId=H1",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/helpers/pending");

        let response = router
            .oneshot(form_post(
                "/helpers/pending/reject",
                "helperId=H2&reason=",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/helpers/pending");
        assert!(mock.pending_ids().await.is_empty());

        let sent = mock.requests_to("/api/v1/admin/helpers/H2/reject").await;
        let reason = sent[0].body.clone().unwrap()["reason"].clone();
        assert!(!reason.as_str().unwrap().trim().is_empty());
    }

    #[tokio::test]
    async fn test_task_status_form() {
        let mock = MockBackend::new();
        mock.seed_task(fixtures::task("T1", TaskStatus::Searching, 5)).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .clone()
            .oneshot(form_post("/tasks/T1/status", "status=", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/tasks/T1");
        assert!(mock.requests().await.is_empty());

        let response = router
            .clone()
            .oneshot(form_post("/tasks/T1/status", "status=cancelled", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/tasks/T1");
        let sent = mock.requests_to("/api/v1/admin/tasks/T1/status").await;
        assert_eq!(sent[0].body.clone().unwrap()["status"], "CANCELLED");

        let response = router
            .oneshot(form_post("/tasks/T9/status", "status=COMPLETED", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/tasks/T9?error=status_failed_404");
    }

    #[tokio::test]
    async fn test_unrecognised_status_is_forwarded() {
        let mock = MockBackend::new();
        mock.seed_task(fixtures::task("T1", TaskStatus::Searching, 5)).await;
        mock.seed_ticket(fixtures::ticket("S1", TicketStatus::Open)).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .clone()
            .oneshot(form_post("/tasks/T1/status", "status=+ON_HOLD+", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/tasks/T1?error=status_failed_400");
        let sent = mock.requests_to("/api/v1/admin/tasks/T1/status").await;
        assert_eq!(sent[0].body.clone().unwrap()["status"], "ON_HOLD");

        let response = router
            .clone()
            .oneshot(form_post(
                "/support/tickets/S1/status",
                "status=ESCALATED",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/support/tickets/S1?error=status_failed_400"
        );

        let response = router
            .oneshot(form_post(
                "/buyers/create",
                "phone=9000000001&status=SUSPENDED",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/buyers?error=create_failed_400");
        let sent = mock.requests_to("/api/v1/admin/buyers").await;
        assert_eq!(sent[0].body.clone().unwrap()["status"], "SUSPENDED");
        assert!(mock.buyers().await.is_empty());
    }

    #[tokio::test]
    async fn test_ticket_reply_and_status() {
        let mock = MockBackend::new();
        mock.seed_ticket(fixtures::ticket("S1", TicketStatus::Open)).await;
        let (router, _server) = app(&mock).await;
        let cookie = admin_cookie(&mock).await;

        let response = router
            .clone()
            .oneshot(form_post(
                "/support/tickets/S1/messages",
                "message=+On+it+",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/support/tickets/S1");
        let sent = mock.requests_to("/api/v1/admin/support/tickets/S1/messages").await;
        assert_eq!(sent[0].body.clone().unwrap()["message"], "On it");

        let response = router
            .clone()
            .oneshot(form_post(
                "/support/tickets/S1/status",
                "status=RESOLVED",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/support/tickets/S1");

        let response = router
            .oneshot(form_post(
                "/support/tickets/S404/messages",
                "message=hello",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/support/tickets/S404?error=message_failed_404"
        );
    }
}
