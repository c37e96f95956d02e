use him_shared::types::{Task, TaskStatus};
use him_shared::Route;
use him_store::SessionBackend;
use serde::Serialize;

use super::{require_token, rows_or_empty, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksPage {
    /// Active filter; `None` lists every task.
    pub status: Option<TaskStatus>,
    pub rows: Vec<Task>,
    pub error: Option<PageError>,
}

impl TasksPage {
    /// `filter` is the raw `status` query value. Blank or unknown values
    /// list everything.
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
        filter: Option<&str>,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let status = TaskStatus::parse_filter(filter);
        let result = store.admin().list_tasks(status.as_ref()).await;
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

    /// Route for a row's detail view.
    pub fn detail_route(task: &Task) -> Route {
        Route::task(&task.id)
    }
}

#[cfg(test)]
mod tests {
    use him_testkit::{fixtures, MockBackend};

    use super::*;
    use crate::pages::test_support::{signed_in, signed_out};

    async fn seeded() -> MockBackend {
        let mock = MockBackend::new();
        mock.seed_task(fixtures::task("T1", TaskStatus::Searching, 3))
            .await;
        mock.seed_task(fixtures::task("T2", TaskStatus::Completed, 2))
            .await;
        mock.seed_task(fixtures::task("T3", TaskStatus::Searching, 1))
            .await;
        mock
    }

    #[tokio::test]
    async fn test_redirects_without_token() {
        let mock = seeded().await;
        let (store, _server) = signed_out(&mock).await;
        let (mount, _handle) = Mount::new();

        let outcome = TasksPage::load(&store, &mount, None).await;
        assert_eq!(outcome.redirect(), Some(&Route::LOGIN));
    }

    #[tokio::test]
    async fn test_filter_is_parsed_case_insensitively() {
        let mock = seeded().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = TasksPage::load(&store, &mount, Some("searching"))
            .await
            .ready()
            .unwrap();
        assert_eq!(page.status, Some(TaskStatus::Searching));
        let ids: Vec<&str> = page.rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T3"]);
        assert_eq!(
            TasksPage::detail_route(&page.rows[0]).location(),
            "/tasks/T1"
        );
    }

    #[tokio::test]
    async fn test_unknown_filter_lists_everything() {
        let mock = seeded().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = TasksPage::load(&store, &mount, Some("teleported"))
            .await
            .ready()
            .unwrap();
        assert_eq!(page.status, None);
        assert_eq!(page.rows.len(), 3);
        let sent = mock.requests_to("/api/v1/admin/tasks").await;
        assert_eq!(sent[0].query, None);
    }
}
