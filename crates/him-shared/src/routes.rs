//! Console routes shared by both front-ends.
//!
//! Page controllers redirect by returning a [`Route`]; the server-rendered
//! variant turns it into a `Location` header, optionally carrying an
//! `error` code in the query string.

use std::fmt;

use crate::error::ErrorCode;
use crate::types::{TaskStatus, TicketStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Phone,
    Otp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Login { step: LoginStep },
    Signup,
    Buyers,
    Helpers,
    PendingHelpers,
    Tasks { status: Option<TaskStatus> },
    TaskDetail { task_id: String },
    SupportTickets { status: Option<TicketStatus> },
    TicketDetail { ticket_id: String },
}

impl Route {
    pub const LOGIN: Route = Route::Login {
        step: LoginStep::Phone,
    };

    pub fn task(task_id: impl Into<String>) -> Self {
        Route::TaskDetail {
            task_id: task_id.into(),
        }
    }

    pub fn ticket(ticket_id: impl Into<String>) -> Self {
        Route::TicketDetail {
            ticket_id: ticket_id.into(),
        }
    }

    /// Path plus any query parameters the route itself carries.
    pub fn location(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Login {
                step: LoginStep::Phone,
            } => "/login".to_string(),
            Route::Login {
                step: LoginStep::Otp,
            } => "/login?step=otp".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Buyers => "/buyers".to_string(),
            Route::Helpers => "/helpers".to_string(),
            Route::PendingHelpers => "/helpers/pending".to_string(),
            Route::Tasks { status: None } => "/tasks".to_string(),
            Route::Tasks {
                status: Some(status),
            } => format!("/tasks?status={status}"),
            Route::TaskDetail { task_id } => format!("/tasks/{}", urlencoding::encode(task_id)),
            Route::SupportTickets { status: None } => "/support/tickets".to_string(),
            Route::SupportTickets {
                status: Some(status),
            } => format!("/support/tickets?status={status}"),
            Route::TicketDetail { ticket_id } => {
                format!("/support/tickets/{}", urlencoding::encode(ticket_id))
            }
        }
    }

    /// Location with an `error=<code>` query parameter appended.
    pub fn with_error(&self, code: &ErrorCode) -> String {
        self.with_query("error", &code.to_string())
    }

    pub fn with_query(&self, key: &str, value: &str) -> String {
        let base = self.location();
        let sep = if base.contains('?') { '&' } else { '?' };
        format!("{base}{sep}{key}={}", urlencoding::encode(value))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}
