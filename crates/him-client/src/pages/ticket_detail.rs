use him_shared::types::{TicketDetail, TicketStatus};
use him_shared::{MutationAction, Route};
use him_store::SessionBackend;
use serde::Serialize;
use tracing::info;

use super::{failed, require_token, Mutation, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// A support ticket with its message thread.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailPage {
    pub ticket_id: String,
    pub ticket: Option<TicketDetail>,
    pub error: Option<PageError>,
}

impl TicketDetailPage {
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
        ticket_id: &str,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let ticket_id = ticket_id.trim();
        if ticket_id.is_empty() {
            return PageOutcome::Redirect(Route::SupportTickets { status: None });
        }

        let result = store.admin().ticket(ticket_id).await;
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }
        let mut page = Self {
            ticket_id: ticket_id.to_string(),
            ticket: None,
            error: None,
        };
        match result {
            Ok(ticket) => page.ticket = ticket,
            Err(e) => page.error = Some(PageError::from_api(&e)),
        }
        PageOutcome::Ready(page)
    }

    /// Post an admin reply and append it to the thread. Blank replies are
    /// not sent.
    pub async fn reply<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        message: &str,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let message = message.trim();
        if message.is_empty() {
            return Mutation::Skipped;
        }
        let result = store.admin().post_reply(&self.ticket_id, message).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(posted) => {
                if let (Some(posted), Some(detail)) = (posted, self.ticket.as_mut()) {
                    detail.ticket.last_message_at = posted.created_at;
                    detail.messages.push(posted);
                }
                self.error = None;
                Mutation::Applied
            }
            Err(e) => failed(MutationAction::Message, &e, &mut self.error),
        }
    }

    /// The status is patched locally; the response body is ignored.
    pub async fn set_status<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        status: TicketStatus,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store
            .admin()
            .set_ticket_status(&self.ticket_id, &status)
            .await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => {
                info!(ticket_id = %self.ticket_id, %status, "ticket status changed");
                if let Some(detail) = self.ticket.as_mut() {
                    detail.ticket.status = status;
                }
                self.error = None;
                Mutation::Applied
            }
            Err(e) => failed(MutationAction::Status, &e, &mut self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use him_shared::ErrorCode;
    use him_testkit::{fixtures, MockBackend};

    use super::*;
    use crate::pages::test_support::signed_in;

    async fn open_ticket() -> MockBackend {
        let mock = MockBackend::new();
        mock.seed_ticket(fixtures::ticket("S1", TicketStatus::Open))
            .await;
        mock
    }

    #[tokio::test]
    async fn test_reply_appends_message() {
        let mock = open_ticket().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();
        let mut page = TicketDetailPage::load(&store, &mount, "S1")
            .await
            .ready()
            .unwrap();
        assert_eq!(page.ticket.as_ref().unwrap().messages.len(), 1);

        let outcome = page
            .reply(&store, &mount, "  Refund issued, sorry about that.  ")
            .await;
        assert_eq!(outcome, Mutation::Applied);
        let messages = &page.ticket.as_ref().unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].author_type, "ADMIN");
        assert_eq!(messages[1].message, "Refund issued, sorry about that.");
    }

    #[tokio::test]
    async fn test_blank_reply_is_skipped() {
        let mock = open_ticket().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();
        let mut page = TicketDetailPage::load(&store, &mount, "S1")
            .await
            .ready()
            .unwrap();

        assert_eq!(page.reply(&store, &mount, "   ").await, Mutation::Skipped);
        assert!(mock
            .requests_to("/api/v1/admin/support/tickets/S1/messages")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_set_status_patches_ticket() {
        let mock = open_ticket().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();
        let mut page = TicketDetailPage::load(&store, &mount, "S1")
            .await
            .ready()
            .unwrap();

        let outcome = page.set_status(&store, &mount, TicketStatus::Resolved).await;
        assert_eq!(outcome, Mutation::Applied);
        assert_eq!(
            page.ticket.as_ref().map(|t| t.ticket.status.clone()),
            Some(TicketStatus::Resolved)
        );
    }

    #[tokio::test]
    async fn test_failed_reply_surfaces_error() {
        let mock = open_ticket().await;
        mock.fail(
            "POST",
            "/api/v1/admin/support/tickets/S1/messages",
            500,
            "",
        )
        .await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();
        let mut page = TicketDetailPage::load(&store, &mount, "S1")
            .await
            .ready()
            .unwrap();

        let outcome = page.reply(&store, &mount, "hello").await;
        assert_eq!(
            outcome,
            Mutation::Failed(ErrorCode::mutation(MutationAction::Message, 500))
        );
        assert_eq!(page.ticket.as_ref().unwrap().messages.len(), 1);
        assert_eq!(page.error.map(|e| e.status), Some(500));
    }
}
