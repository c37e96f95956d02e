//! Client-rendered page controllers.
//!
//! Every protected page follows the same contract: without an access token
//! it redirects to the login route before touching the network; otherwise it
//! loads its sections (concurrently when they are independent), degrading a
//! failed section to empty data plus an error, and then applies mutations by
//! patching its rows from the backend's response.

pub mod buyers;
pub mod dashboard;
pub mod helpers;
pub mod login;
pub mod pending_helpers;
pub mod signup;
pub mod support_tickets;
pub mod task_detail;
pub mod tasks;
pub mod ticket_detail;

use std::fmt;

use him_net::{ApiError, ApiResult};
use him_shared::{ErrorCode, MutationAction, Route};
use him_store::SessionBackend;
use serde::Serialize;

use crate::session::SessionStore;

pub use buyers::BuyersPage;
pub use dashboard::DashboardPage;
pub use helpers::HelpersPage;
pub use login::LoginPage;
pub use pending_helpers::PendingHelpersPage;
pub use signup::{SignupNotice, SignupPage};
pub use support_tickets::SupportTicketsPage;
pub use task_detail::TaskDetailPage;
pub use tasks::TasksPage;
pub use ticket_detail::TicketDetailPage;

/// Result of loading a page.
#[derive(Debug)]
pub enum PageOutcome<T> {
    Ready(T),
    Redirect(Route),
    /// The page was unmounted while loading; nothing should be shown.
    Cancelled,
}

impl<T> PageOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            PageOutcome::Ready(page) => Some(page),
            _ => None,
        }
    }

    pub fn redirect(&self) -> Option<&Route> {
        match self {
            PageOutcome::Redirect(route) => Some(route),
            _ => None,
        }
    }
}

/// Result of a submitted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    Failed(ErrorCode),
    Redirect(Route),
    /// Nothing was sent, e.g. a blank reply.
    Skipped,
    Cancelled,
}

/// A load or action failure as shown on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageError {
    pub status: u16,
    pub message: String,
}

impl PageError {
    pub fn from_api(error: &ApiError) -> Self {
        Self {
            status: error.status(),
            message: error.error_text().to_string(),
        }
    }

    fn from_code(code: &ErrorCode, status: u16) -> Self {
        Self {
            status,
            message: code.message(),
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The token to call the backend with, or the login redirect.
fn require_token<B: SessionBackend>(store: &SessionStore<B>) -> Result<&str, Route> {
    store.current_token().ok_or(Route::LOGIN)
}

/// Payload of a list load. A null payload is an empty list; a failure is
/// recorded in `error` and also yields an empty list.
fn rows_or_empty<T>(result: ApiResult<Vec<T>>, error: &mut Option<PageError>) -> Vec<T> {
    match result {
        Ok(rows) => rows.unwrap_or_default(),
        Err(e) => {
            tracing::debug!(status = e.status(), "section failed to load");
            *error = Some(PageError::from_api(&e));
            Vec::new()
        }
    }
}

/// Record a failed action on the page and build the matching outcome.
fn failed(action: MutationAction, error: &ApiError, slot: &mut Option<PageError>) -> Mutation {
    let code = ErrorCode::mutation(action, error.status());
    tracing::warn!(action = action.as_str(), status = error.status(), "admin action failed");
    let mut page_error = PageError::from_code(&code, error.status());
    if let ApiError::Http { body, .. } = error {
        if !body.is_empty() {
            page_error.message = format!("{} {}", page_error.message, body);
        }
    }
    *slot = Some(page_error);
    Mutation::Failed(code)
}
