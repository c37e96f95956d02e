use him_shared::protocol::{AccountUpdate, NewAccount};
use him_shared::types::{AccountStatus, Buyer};
use him_shared::MutationAction;
use him_store::SessionBackend;
use serde::Serialize;
use tracing::info;

use super::{failed, require_token, rows_or_empty, Mutation, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// Buyer account grid with inline create, edit and delete.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyersPage {
    pub rows: Vec<Buyer>,
    pub error: Option<PageError>,
}

impl BuyersPage {
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let result = store.admin().list_buyers().await;
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }
        let mut page = Self::default();
        page.rows = rows_or_empty(result, &mut page.error);
        PageOutcome::Ready(page)
    }

    /// Create a buyer and put it at the top of the grid. Accounts created
    /// without a status start out active.
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
        let result = store.admin().create_buyer(&account).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(Some(buyer)) => {
                info!(buyer_id = %buyer.id, "buyer created");
                self.rows.insert(0, buyer);
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
        let result = store.admin().update_buyer(id, &update).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(Some(buyer)) => {
                if let Some(row) = self.rows.iter_mut().find(|row| row.id == buyer.id) {
                    *row = buyer;
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
        let result = store.admin().delete_buyer(id).await;
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

    /// Re-read the grid after a mutation whose response carried no row.
    async fn reload<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
    ) -> Mutation {
        let result = store.admin().list_buyers().await;
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
