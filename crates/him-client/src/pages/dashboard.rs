use him_shared::constants::RECENT_TASKS_LIMIT;
use him_shared::types::{AdminSummary, RecentTask};
use him_store::SessionBackend;
use serde::Serialize;
use tracing::warn;

use super::{require_token, PageError, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// Marketplace counters and the most recent tasks.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPage {
    pub summary: AdminSummary,
    pub recent_tasks: Vec<RecentTask>,
    pub error: Option<PageError>,
}

impl DashboardPage {
    /// Summary and recent tasks are fetched concurrently. A failed summary
    /// shows zeros plus an error; a failed recent list is just empty.
    pub async fn load<B: SessionBackend>(
        store: &SessionStore<B>,
        mount: &Mount,
    ) -> PageOutcome<Self> {
        if let Err(route) = require_token(store) {
            return PageOutcome::Redirect(route);
        }
        let api = store.admin();

        let (summary, recent) =
            futures::join!(api.summary(), api.recent_tasks(RECENT_TASKS_LIMIT));
        if !mount.is_active() {
            return PageOutcome::Cancelled;
        }

        let mut page = Self::default();
        match summary {
            Ok(summary) => page.summary = summary.unwrap_or_default(),
            Err(e) => page.error = Some(PageError::from_api(&e)),
        }
        match recent {
            Ok(tasks) => page.recent_tasks = tasks.unwrap_or_default(),
            Err(e) => warn!(status = e.status(), error = %e, "recent tasks unavailable"),
        }
        PageOutcome::Ready(page)
    }
}

#[cfg(test)]
mod tests {
    use him_shared::types::TaskStatus;
    use him_shared::Route;
    use him_testkit::{fixtures, MockBackend};

    use super::*;
    use crate::pages::test_support::{signed_in, signed_out};

    async fn seeded() -> MockBackend {
        let mock = MockBackend::new();
        for (i, status) in [
            TaskStatus::Searching,
            TaskStatus::Assigned,
            TaskStatus::Started,
            TaskStatus::Completed,
            TaskStatus::Completed,
            TaskStatus::Searching,
            TaskStatus::Cancelled,
        ]
        .into_iter()
        .enumerate()
        {
            mock.seed_task(fixtures::task(&format!("T{i}"), status, i as i64))
                .await;
        }
        mock
    }

    #[tokio::test]
    async fn test_redirects_without_token() {
        let mock = seeded().await;
        let (store, _server) = signed_out(&mock).await;
        let (mount, _handle) = Mount::new();

        let outcome = DashboardPage::load(&store, &mount).await;
        assert_eq!(outcome.redirect(), Some(&Route::LOGIN));
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_loads_summary_and_recent_tasks() {
        let mock = seeded().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = DashboardPage::load(&store, &mount).await.ready().unwrap();
        assert!(page.error.is_none());
        assert_eq!(page.summary.searching_tasks, 2);
        assert_eq!(page.summary.completed_tasks, 2);
        assert_eq!(page.recent_tasks.len(), RECENT_TASKS_LIMIT);

        let sent = mock.requests_to("/api/v1/admin/tasks/recent").await;
        assert_eq!(sent[0].query.as_deref(), Some("limit=5"));
    }

    #[tokio::test]
    async fn test_recent_tasks_decode_from_projection() {
        let mock = MockBackend::new();
        mock.respond(
            "GET",
            "/api/v1/admin/tasks/recent",
            200,
            r#"[{"id":"T1","status":"SEARCHING","createdAt":"2024-05-01T10:00:00Z",
                "title":"Fix tap","urgency":"NOW","budgetPaise":5000},
               {"id":"T2","status":"ON_HOLD","createdAt":"2024-05-01T09:00:00Z",
                "title":"Paint wall","urgency":"LATER","budgetPaise":90000}]"#,
        )
        .await;
        mock.respond(
            "GET",
            "/api/v1/admin/summary",
            200,
            r#"{"pendingHelpers":4,"completedTasks":7}"#,
        )
        .await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = DashboardPage::load(&store, &mount).await.ready().unwrap();
        assert!(page.error.is_none());
        assert_eq!(page.summary.pending_helpers, 4);
        assert_eq!(page.summary.completed_tasks, 7);
        assert_eq!(page.summary.active_tasks(), 0);

        let ids: Vec<_> = page.recent_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["T1", "T2"]);
        assert_eq!(page.recent_tasks[0].title, "Fix tap");
        assert_eq!(page.recent_tasks[0].budget_paise, 5000);
        assert_eq!(
            page.recent_tasks[1].status,
            TaskStatus::Other("ON_HOLD".into())
        );
    }

    #[tokio::test]
    async fn test_failed_summary_degrades_to_zeros() {
        let mock = seeded().await;
        mock.fail("GET", "/api/v1/admin/summary", 500, "boom").await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = DashboardPage::load(&store, &mount).await.ready().unwrap();
        assert_eq!(page.summary, AdminSummary::default());
        let error = page.error.unwrap();
        assert_eq!(error.status, 500);
        assert_eq!(error.message, "boom");
        assert_eq!(page.recent_tasks.len(), RECENT_TASKS_LIMIT);
    }

    #[tokio::test]
    async fn test_failed_recent_list_is_silent() {
        let mock = seeded().await;
        mock.fail("GET", "/api/v1/admin/tasks/recent", 503, "").await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, _handle) = Mount::new();

        let page = DashboardPage::load(&store, &mount).await.ready().unwrap();
        assert!(page.error.is_none());
        assert!(page.recent_tasks.is_empty());
        assert_eq!(page.summary.searching_tasks, 2);
    }

    #[tokio::test]
    async fn test_unmounted_page_discards_results() {
        let mock = seeded().await;
        let (store, _server) = signed_in(&mock).await;
        let (mount, handle) = Mount::new();
        handle.unmount();

        let outcome = DashboardPage::load(&store, &mount).await;
        assert!(matches!(outcome, PageOutcome::Cancelled));
    }
}
