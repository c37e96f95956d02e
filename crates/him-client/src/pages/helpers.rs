use him_shared::protocol::{AccountUpdate, NewAccount};
use him_shared::types::{AccountStatus, Helper, KycStatus};
use him_shared::MutationAction;
use him_store::SessionBackend;
use serde::Serialize;
use tracing::info;

use super::{failed, require_token, rows_or_empty, Mutation, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// Helper account grid. Besides the account fields it shows each helper's
/// KYC state and lets the operator send an approved or rejected helper
/// back for review.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpersPage {
    pub rows: Vec<Helper>,
    pub error: Option<PageError>,
}

impl HelpersPage {
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let result = store.admin().list_helpers().await;
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }
        let mut page = Self::default();
        page.rows = rows_or_empty(result, &mut page.error);
        PageOutcome::Ready(page)
    }

    pub async fn create<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        mut account: NewAccount,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        account.status = account.status.or(Some(AccountStatus::Active));
        let result = store.admin().create_helper(&account).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(Some(helper)) => {
                info!(helper_id = %helper.id, "helper created");
                self.rows.insert(0, helper);
                self.error = None;
                Mutation::Applied
            }
            Ok(None) => self.reload(store, mount).await,
            Err(e) => failed(MutationAction::Create, &e, &mut self.error),
        }
    }

    pub async fn update<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        id: &str,
        update: AccountUpdate,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store.admin().update_helper(id, &update).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(Some(helper)) => {
                if let Some(row) = self.rows.iter_mut().find(|row| row.id == helper.id) {
                    *row = helper;
                }
                self.error = None;
                Mutation::Applied
            }
            Ok(None) => self.reload(store, mount).await,
            Err(e) => failed(MutationAction::Update, &e, &mut self.error),
        }
    }

    pub async fn delete<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        id: &str,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store.admin().delete_helper(id).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => {
                self.rows.retain(|row| row.id != id);
                self.error = None;
                Mutation::Applied
            }
            Err(e) => failed(MutationAction::Delete, &e, &mut self.error),
        }
    }

    /// Put a helper's KYC back into review. The row is marked pending
    /// locally; the backend's response body is not inspected.
    pub async fn reopen_kyc<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        id: &str,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store.admin().reopen_kyc(id).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => {
                if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
                    row.helper_kyc_status = Some(KycStatus::Pending);
                }
                self.error = None;
                Mutation::Applied
            }
            Err(e) => failed(MutationAction::Reopen, &e, &mut self.error),
        }
    }

    async fn reload<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
    ) -> Mutation {
        let result = store.admin().list_helpers().await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        let mut error = None;
        let rows = rows_or_empty(result, &mut error);
        if error.is_none() {
            self.rows = rows;
        }
        self.error = error;
        Mutation::Applied
    }
}

#[cfg(test)]
mod tests {
    use him_shared::{ErrorCode, Route};
    use him_testkit::{fixtures, MockBackend};

    use super::*;
    use crate::pages::test_support::{signed_in, signed_out};

    async fn seeded() -> MockBackend {
        let mock = MockBackend::new();
        mock.seed_helper(fixtures::helper("H1")).await;
        mock.seed_helper(fixtures::helper("H2")).await;
        mock
    }

    #[tokio::test]
    async fn test_redirects_without_token() {
        let mock = seeded().await;
        let (store, _server) = signed_out(&mock).await;
        let (mount, _handle) = Mount::new();

        let outcome = HelpersPage::load(&store, &mount).await;
        assert_eq!(outcome.redirect(), Some(&Route::LOGIN));
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let mock = seeded().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();
        let mut page = HelpersPage::load(&store, &mount).await.ready().unwrap();
        assert_eq!(page.rows.len(), 2);

        let account = NewAccount::from_form("8000000009", "", "", "secret", "");
        assert_eq!(page.create(&store, &mount, account).await, Mutation::Applied);
        let new_id = page.rows[0].id.clone();
        assert_eq!(page.rows[0].phone.as_deref(), Some("8000000009"));

        let update = AccountUpdate::from_form("8000000009", "", "Kiran", "BLOCKED");
        assert_eq!(
            page.update(&store, &mount, &new_id, update).await,
            Mutation::Applied
        );
        assert_eq!(page.rows[0].status, AccountStatus::Blocked);

        assert_eq!(page.delete(&store, &mount, "H1").await, Mutation::Applied);
        let ids: Vec<&str> = page.rows.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec![new_id.as_str(), "H2"]);
        assert_eq!(mock.helpers().await.len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_kyc_marks_row_pending() {
        let mock = seeded().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();
        let mut page = HelpersPage::load(&store, &mount).await.ready().unwrap();

        assert_eq!(page.reopen_kyc(&store, &mount, "H2").await, Mutation::Applied);
        assert_eq!(page.rows[1].helper_kyc_status, Some(KycStatus::Pending));
        assert_eq!(mock.pending_ids().await, vec!["H2".to_string()]);

        // a second reopen conflicts; the row keeps its state
        let outcome = page.reopen_kyc(&store, &mount, "H2").await;
        assert_eq!(
            outcome,
            Mutation::Failed(ErrorCode::mutation(MutationAction::Reopen, 409))
        );
        assert_eq!(page.rows[1].helper_kyc_status, Some(KycStatus::Pending));
        assert_eq!(page.error.as_ref().map(|e| e.status), Some(409));
    }
}
