use him_shared::types::{SupportTicket, TicketStatus};
use him_store::SessionBackend;
use serde::Serialize;

use super::{require_token, rows_or_empty, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// Support inbox, optionally filtered by ticket status.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicketsPage {
    pub status: Option<TicketStatus>,
    pub rows: Vec<SupportTicket>,
    pub error: Option<PageError>,
}

impl SupportTicketsPage {
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
        filter: Option<&str>,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let status = TicketStatus::parse_filter(filter);
        let result = store.admin().list_tickets(status.as_ref()).await;
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }
        let mut page = Self {
            status,
            ..Self::default()
        };
        page.rows = rows_or_empty(result, &mut page.error);
        PageOutcome::Ready(page)
    }
}

#[cfg(test)]
mod tests {
    use him_testkit::{fixtures, MockBackend};

    use super::*;
    use crate::pages::test_support::signed_in;

    #[tokio::test]
    async fn test_lists_tickets_by_status() {
        let mock = MockBackend::new();
        mock.seed_ticket(fixtures::ticket("S1", TicketStatus::Open))
            .await;
        mock.seed_ticket(fixtures::ticket("S2", TicketStatus::InProgress))
            .await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = SupportTicketsPage::load(&store, &mount, Some("IN_PROGRESS"))
            .await
            .ready()
            .unwrap();
        assert_eq!(page.status, Some(TicketStatus::InProgress));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].id, "S2");

        let all = SupportTicketsPage::load(&store, &mount, Some(""))
            .await
            .ready()
            .unwrap();
        assert_eq!(all.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_revoked_token_degrades_list() {
        let mock = MockBackend::new();
        let (store, _server) = signed_in(&mock).await;
        mock.revoke_tokens().await;
        let (mount, _handle) = Mount::new();

        let page = SupportTicketsPage::load(&store, &mount, None)
            .await
            .ready()
            .unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.error.map(|e| e.status), Some(401));
    }
}
