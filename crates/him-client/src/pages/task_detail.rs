use him_shared::types::{TaskDetail, TaskStatus};
use him_shared::{MutationAction, Route};
use him_store::SessionBackend;
use serde::Serialize;
use tracing::info;

use super::{failed, require_token, Mutation, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// One task with its contacts and selfie evidence.
///
/// `task` is `None` when the load failed; `error` then says why.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailPage {
    pub task_id: String,
    pub task: Option<TaskDetail>,
    pub error: Option<PageError>,
}

impl TaskDetailPage {
    /// A blank id goes back to the task list.
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
        task_id: &str,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return PageOutcome::Redirect(Route::Tasks { status: None });
        }

        let result = store.admin().task(task_id).await;
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }
        let mut page = Self {
            task_id: task_id.to_string(),
            task: None,
            error: None,
        };
        match result {
            Ok(task) => page.task = task,
            Err(e) => page.error = Some(PageError::from_api(&e)),
        }
        PageOutcome::Ready(page)
    }

    /// Move the task to `status`. The returned detail replaces the shown
    /// one; an empty response just updates the status in place.
    pub async fn set_status<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        status: TaskStatus,
    ) -> Mutation {
        if let Err(route) = require_token(store) {
            return Mutation::Redirect(route);
        }
        let result = store.admin().set_task_status(&self.task_id, &status).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(Some(detail)) => {
                info!(task_id = %self.task_id, %status, "task status changed");
                self.task = Some(detail);
                self.error = None;
                Mutation::Applied
            }
            Ok(None) => {
                if let Some(detail) = self.task.as_mut() {
                    detail.task.status = status;
                }
                self.error = None;
                Mutation::Applied
            }
            Err(e) => failed(MutationAction::Status, &e, &mut self.error),
        }
    }
}
