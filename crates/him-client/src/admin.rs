//! Typed wrappers over the backend's admin and signup endpoints.

use him_net::{ApiClient, ApiRequest, ApiResult, FormField};
use him_shared::constants::{endpoints, DEFAULT_REJECT_REASON};
use him_shared::protocol::{
    AccountUpdate, BuyerSignupRequest, HelperKycSignup, NewAccount, RejectRequest,
    TaskStatusChange, TicketReply, TicketStatusChange,
};
use him_shared::types::{
    AdminSummary, Buyer, Helper, PendingHelper, RecentTask, SupportTicket, Task, TaskDetail,
    TaskStatus, TicketDetail, TicketMessage, TicketStatus,
};

fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

/// Admin endpoints, authorised with the token the session holds.
///
/// Actions whose response the console ignores never decode the body, so a
/// plain-text `OK` from the backend still counts as success.
#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a ApiClient,
    token: Option<&'a str>,
}

impl<'a> AdminApi<'a> {
    pub fn new(client: &'a ApiClient, token: Option<&'a str>) -> Self {
        Self { client, token }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.client.fetch(path, ApiRequest::get(), self.token).await
    }

    async fn post<T, B>(&self, path: &str, body: B) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        self.client
            .fetch(path, ApiRequest::post(body), self.token)
            .await
    }

    async fn post_empty(&self, path: &str) -> ApiResult<()> {
        self.client
            .execute(path, ApiRequest::post_empty(), self.token)
            .await
    }

    // -- dashboard --

    pub async fn summary(&self) -> ApiResult<AdminSummary> {
        self.get(endpoints::ADMIN_SUMMARY).await
    }

    pub async fn recent_tasks(&self, limit: usize) -> ApiResult<Vec<RecentTask>> {
        self.get(&format!("{}?limit={limit}", endpoints::ADMIN_RECENT_TASKS))
            .await
    }

    // -- buyers --

    pub async fn list_buyers(&self) -> ApiResult<Vec<Buyer>> {
        self.get(endpoints::ADMIN_BUYERS).await
    }

    pub async fn create_buyer(&self, account: &NewAccount) -> ApiResult<Buyer> {
        self.post(endpoints::ADMIN_BUYERS, account).await
    }

    pub async fn update_buyer(&self, id: &str, update: &AccountUpdate) -> ApiResult<Buyer> {
        let path = format!("{}/{}/update", endpoints::ADMIN_BUYERS, segment(id));
        self.post(&path, update).await
    }

    pub async fn delete_buyer(&self, id: &str) -> ApiResult<()> {
        let path = format!("{}/{}/delete", endpoints::ADMIN_BUYERS, segment(id));
        self.post_empty(&path).await
    }

    // -- helpers --

    pub async fn list_helpers(&self) -> ApiResult<Vec<Helper>> {
        self.get(endpoints::ADMIN_HELPERS).await
    }

    pub async fn create_helper(&self, account: &NewAccount) -> ApiResult<Helper> {
        self.post(endpoints::ADMIN_HELPERS, account).await
    }

    pub async fn update_helper(&self, id: &str, update: &AccountUpdate) -> ApiResult<Helper> {
        let path = format!("{}/{}/update", endpoints::ADMIN_HELPERS, segment(id));
        self.post(&path, update).await
    }

    pub async fn delete_helper(&self, id: &str) -> ApiResult<()> {
        let path = format!("{}/{}/delete", endpoints::ADMIN_HELPERS, segment(id));
        self.post_empty(&path).await
    }

    /// Remove any account, buyer or helper.
    pub async fn delete_user(&self, id: &str) -> ApiResult<()> {
        let path = format!("{}/{}", endpoints::ADMIN_USERS, segment(id));
        self.client
            .execute(&path, ApiRequest::delete(), self.token)
            .await
    }

    // -- KYC review --

    pub async fn pending_helpers(&self) -> ApiResult<Vec<PendingHelper>> {
        self.get(endpoints::ADMIN_PENDING_HELPERS).await
    }

    pub async fn approve_helper(&self, id: &str) -> ApiResult<()> {
        let path = format!("{}/{}/approve", endpoints::ADMIN_HELPERS, segment(id));
        self.post_empty(&path).await
    }

    /// Reject a helper's KYC. A blank or missing reason becomes "Rejected".
    pub async fn reject_helper(&self, id: &str, reason: Option<&str>) -> ApiResult<()> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REJECT_REASON);
        let path = format!("{}/{}/reject", endpoints::ADMIN_HELPERS, segment(id));
        let body = RejectRequest {
            reason: reason.to_string(),
        };
        self.client
            .execute(&path, ApiRequest::post(body), self.token)
            .await
    }

    pub async fn reopen_kyc(&self, id: &str) -> ApiResult<()> {
        let path = format!("{}/{}/reopen-kyc", endpoints::ADMIN_HELPERS, segment(id));
        self.post_empty(&path).await
    }

    // -- tasks --

    pub async fn list_tasks(&self, status: Option<&TaskStatus>) -> ApiResult<Vec<Task>> {
        match status {
            Some(status) => {
                self.get(&format!("{}?status={}", endpoints::ADMIN_TASKS, status.as_str()))
                    .await
            }
            None => self.get(endpoints::ADMIN_TASKS).await,
        }
    }

    pub async fn task(&self, id: &str) -> ApiResult<TaskDetail> {
        self.get(&format!("{}/{}", endpoints::ADMIN_TASKS, segment(id)))
            .await
    }

    pub async fn set_task_status(&self, id: &str, status: &TaskStatus) -> ApiResult<TaskDetail> {
        let path = format!("{}/{}/status", endpoints::ADMIN_TASKS, segment(id));
        let body = TaskStatusChange {
            status: status.clone(),
        };
        self.post(&path, body).await
    }

    // -- support --

    pub async fn list_tickets(
        &self,
        status: Option<&TicketStatus>,
    ) -> ApiResult<Vec<SupportTicket>> {
        match status {
            Some(status) => {
                self.get(&format!("{}?status={}", endpoints::ADMIN_TICKETS, status.as_str()))
                    .await
            }
            None => self.get(endpoints::ADMIN_TICKETS).await,
        }
    }

    pub async fn ticket(&self, id: &str) -> ApiResult<TicketDetail> {
        self.get(&format!("{}/{}", endpoints::ADMIN_TICKETS, segment(id)))
            .await
    }

    pub async fn post_reply(&self, id: &str, message: &str) -> ApiResult<TicketMessage> {
        let path = format!("{}/{}/messages", endpoints::ADMIN_TICKETS, segment(id));
        self.post(
            &path,
            TicketReply {
                message: message.to_string(),
            },
        )
        .await
    }

    pub async fn set_ticket_status(&self, id: &str, status: &TicketStatus) -> ApiResult<()> {
        let path = format!("{}/{}/status", endpoints::ADMIN_TICKETS, segment(id));
        let body = TicketStatusChange {
            status: status.clone(),
        };
        self.client
            .execute(&path, ApiRequest::post(body), self.token)
            .await
    }

    // -- signup --

    pub async fn signup_buyer(&self, request: &BuyerSignupRequest) -> ApiResult<()> {
        self.client
            .execute(endpoints::PASSWORD_SIGNUP, ApiRequest::post(request), None)
            .await
    }

    /// Submit a helper signup with KYC documents as multipart form data.
    /// Optional text fields are omitted when absent.
    pub async fn signup_helper_kyc(&self, signup: HelperKycSignup) -> ApiResult<()> {
        let mut fields = vec![
            FormField::text("email", signup.email),
            FormField::text("password", signup.password),
        ];
        if let Some(phone) = signup.phone {
            fields.push(FormField::text("phone", phone));
        }
        if let Some(display_name) = signup.display_name {
            fields.push(FormField::text("displayName", display_name));
        }
        fields.extend([
            FormField::text("fullName", signup.full_name),
            FormField::text("idNumber", signup.id_number),
            FormField::file("idFront", signup.id_front),
            FormField::file("idBack", signup.id_back),
            FormField::file("selfie", signup.selfie),
        ]);
        self.client
            .execute(
                endpoints::HELPER_KYC_SIGNUP,
                ApiRequest::multipart(fields),
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use him_net::ApiConfig;
    use serde_json::Value;
    use him_shared::protocol::Upload;
    use him_shared::types::Role;
    use him_testkit::{fixtures, MockBackend};

    use super::*;

    async fn setup() -> (MockBackend, him_testkit::TestServer, ApiClient, String) {
        let mock = MockBackend::new();
        let token = mock.issue_token(Role::Admin).await;
        let server = mock.spawn().await.unwrap();
        let client = ApiClient::new(ApiConfig::new(&server.base_url).unwrap());
        (mock, server, client, token)
    }

    #[tokio::test]
    async fn test_create_buyer_sends_nulls_for_blank_fields() {
        let (mock, _server, client, token) = setup().await;
        let api = AdminApi::new(&client, Some(&token));

        let account = NewAccount::from_form("", "  ", "", "", "ACTIVE");
        let buyer = api.create_buyer(&account).await.unwrap().unwrap();
        assert_eq!(buyer.phone, None);

        let sent = mock.requests_to(endpoints::ADMIN_BUYERS).await;
        let body = sent[0].body.clone().unwrap();
        assert_eq!(body["phone"], Value::Null);
        assert_eq!(body["email"], Value::Null);
        assert_eq!(body["displayName"], Value::Null);
        assert_eq!(body["password"], Value::Null);
        assert_eq!(body["status"], "ACTIVE");
    }

    #[tokio::test]
    async fn test_ids_are_percent_encoded() {
        let (mock, _server, client, token) = setup().await;
        let api = AdminApi::new(&client, Some(&token));

        let err = api.task("a/b c").await.unwrap_err();
        assert_eq!(err.status(), 404);
        let paths: Vec<String> = mock.requests().await.into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/api/v1/admin/tasks/a%2Fb%20c".to_string()]);
    }

    #[tokio::test]
    async fn test_reject_defaults_reason() {
        let (mock, _server, client, token) = setup().await;
        mock.seed_pending_helper(fixtures::pending_helper("H9")).await;
        let api = AdminApi::new(&client, Some(&token));

        api.reject_helper("H9", Some("   ")).await.unwrap();
        let sent = mock.requests_to("/api/v1/admin/helpers/H9/reject").await;
        assert_eq!(sent[0].body, Some(serde_json::json!({ "reason": "Rejected" })));
        assert!(mock.pending_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_status_filter_in_query() {
        let (mock, _server, client, token) = setup().await;
        mock.seed_task(fixtures::task("T1", TaskStatus::Searching, 1))
            .await;
        mock.seed_task(fixtures::task("T2", TaskStatus::Completed, 2))
            .await;
        let api = AdminApi::new(&client, Some(&token));

        let tasks = api
            .list_tasks(Some(&TaskStatus::Completed))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "T2");
        let sent = mock.requests_to(endpoints::ADMIN_TASKS).await;
        assert_eq!(sent[0].query.as_deref(), Some("status=COMPLETED"));
    }

    #[tokio::test]
    async fn test_helper_kyc_signup_is_multipart_without_token() {
        let (mock, _server, client, token) = setup().await;
        let api = AdminApi::new(&client, Some(&token));

        let signup = HelperKycSignup {
            email: "new@helpers.test".into(),
            password: "pw".into(),
            phone: None,
            display_name: Some("Ravi".into()),
            full_name: "Ravi Kumar".into(),
            id_number: "ID-77".into(),
            id_front: Upload::new("front.jpg", vec![1u8, 2, 3]),
            id_back: Upload::new("back.jpg", vec![4u8]),
            selfie: Upload::new("selfie.jpg", vec![5u8]),
        };
        api.signup_helper_kyc(signup).await.unwrap();

        let sent = mock.requests_to(endpoints::HELPER_KYC_SIGNUP).await;
        assert_eq!(sent[0].authorization, None);
        assert!(sent[0]
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data")));
        assert_eq!(mock.pending_ids().await.len(), 1);
    }
}
