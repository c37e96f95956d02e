use him_shared::types::PendingHelper;
use him_shared::MutationAction;
use him_store::SessionBackend;
use serde::Serialize;
use tracing::info;

use super::{failed, require_token, rows_or_empty, Mutation, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// KYC review queue.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingHelpersPage {
    pub rows: Vec<PendingHelper>,
    pub error: Option<PageError>,
}

impl PendingHelpersPage {
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let result = store.admin().pending_helpers().await;
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }
        let mut page = Self::default();
        page.rows = rows_or_empty(result, &mut page.error);
        PageOutcome::Ready(page)
    }

    pub async fn approve<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        helper_id: &str,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store.admin().approve_helper(helper_id).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => {
                info!(helper_id, "kyc approved");
                self.settle(helper_id)
            }
            Err(e) => failed(MutationAction::Approve, &e, &mut self.error),
        }
    }

    /// Reject with the operator's reason, or the default one when blank.
    pub async fn reject<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        helper_id: &str,
        reason: Option<&str>,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store.admin().reject_helper(helper_id, reason).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => {
                info!(helper_id, "kyc rejected");
                self.settle(helper_id)
            }
            Err(e) => failed(MutationAction::Reject, &e, &mut self.error),
        }
    }

    fn settle(&mut self, helper_id: &str) -> Mutation {
        self.rows.retain(|row| row.helper_id != helper_id);
        self.error = None;
        Mutation::Applied
    }
}
