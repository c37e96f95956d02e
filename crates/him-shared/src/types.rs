use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roles and status enumerations
// ---------------------------------------------------------------------------

/// Account role as reported by the backend.
///
/// Unknown roles are kept verbatim so that a login response carrying a role
/// the console does not know about is rejected as non-admin rather than as a
/// malformed payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Buyer,
    Helper,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Buyer => "BUYER",
            Role::Helper => "HELPER",
            Role::Other(raw) => raw,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ADMIN" => Role::Admin,
            "BUYER" => Role::Buyer,
            "HELPER" => Role::Helper,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// KYC review state of a helper. Open-ended for the same reason as [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl KycStatus {
    pub fn as_str(&self) -> &str {
        match self {
            KycStatus::Pending => "PENDING",
            KycStatus::Approved => "APPROVED",
            KycStatus::Rejected => "REJECTED",
            KycStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for KycStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => KycStatus::Pending,
            "APPROVED" => KycStatus::Approved,
            "REJECTED" => KycStatus::Rejected,
            _ => KycStatus::Other(raw),
        }
    }
}

impl From<KycStatus> for String {
    fn from(status: KycStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Returned when a status string is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Account state of a buyer or helper.
///
/// Like [`Role`], values this build does not know are carried as
/// [`AccountStatus::Other`] so that one unfamiliar row does not fail a
/// whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountStatus {
    Active,
    Blocked,
    Other(String),
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 2] = [AccountStatus::Active, AccountStatus::Blocked];

    pub fn as_str(&self) -> &str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Blocked => "BLOCKED",
            AccountStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Searching,
    Assigned,
    Arrived,
    Started,
    Completed,
    Cancelled,
    Other(String),
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Searching,
        TaskStatus::Assigned,
        TaskStatus::Arrived,
        TaskStatus::Started,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Searching => "SEARCHING",
            TaskStatus::Assigned => "ASSIGNED",
            TaskStatus::Arrived => "ARRIVED",
            TaskStatus::Started => "STARTED",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
            TaskStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Other(String),
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Resolved => "RESOLVED",
            TicketStatus::Closed => "CLOSED",
            TicketStatus::Other(raw) => raw,
        }
    }
}

// Wire values are matched exactly; anything else becomes `Other`. Values
// typed into forms and query strings are trimmed and matched
// case-insensitively first.
macro_rules! open_status {
    ($ty:ident) => {
        impl $ty {
            fn known(wanted: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .find(|status| status.as_str() == wanted)
                    .cloned()
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $ty::Other(_))
            }

            /// Parse an optional list filter. Blank or unknown values mean
            /// "no filter".
            pub fn parse_filter(raw: Option<&str>) -> Option<Self> {
                raw.and_then(|value| value.parse().ok())
            }

            /// Status typed by an operator. Blank input is `None`; anything
            /// unrecognised is forwarded as typed for the backend to judge.
            pub fn from_input(raw: &str) -> Option<Self> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                Some(
                    Self::known(&trimmed.to_ascii_uppercase())
                        .unwrap_or_else(|| $ty::Other(trimmed.to_string())),
                )
            }
        }

        impl From<String> for $ty {
            fn from(raw: String) -> Self {
                Self::known(&raw).unwrap_or($ty::Other(raw))
            }
        }

        impl From<$ty> for String {
            fn from(status: $ty) -> Self {
                status.as_str().to_string()
            }
        }

        impl FromStr for $ty {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::known(&s.trim().to_ascii_uppercase())
                    .ok_or_else(|| UnknownStatus(s.to_string()))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_status!(AccountStatus);
open_status!(TaskStatus);
open_status!(TicketStatus);

// ---------------------------------------------------------------------------
// Authenticated identity
// ---------------------------------------------------------------------------

/// Identity returned by the backend alongside a token pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Helper {
    pub id: String,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub helper_kyc_status: Option<KycStatus>,
    #[serde(default)]
    pub helper_kyc_full_name: Option<String>,
    #[serde(default)]
    pub helper_kyc_id_number: Option<String>,
    #[serde(default)]
    pub helper_kyc_doc_front_url: Option<String>,
    #[serde(default)]
    pub helper_kyc_doc_back_url: Option<String>,
    #[serde(default)]
    pub helper_kyc_selfie_url: Option<String>,
    #[serde(default)]
    pub helper_kyc_submitted_at: Option<DateTime<Utc>>,
}

/// A helper waiting for KYC review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingHelper {
    pub helper_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub kyc_full_name: Option<String>,
    #[serde(default)]
    pub kyc_id_number: Option<String>,
    #[serde(default)]
    pub kyc_doc_front_url: Option<String>,
    #[serde(default)]
    pub kyc_doc_back_url: Option<String>,
    #[serde(default)]
    pub kyc_selfie_url: Option<String>,
    #[serde(default)]
    pub kyc_submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub buyer_id: String,
    pub title: String,
    pub description: String,
    pub urgency: String,
    pub time_minutes: u32,
    pub budget_paise: i64,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address_text: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_helper_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row of the dashboard's recent-tasks list. The endpoint returns only
/// these fields, so it is not decoded as a full [`Task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTask {
    pub id: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub urgency: String,
    pub budget_paise: i64,
}

impl From<&Task> for RecentTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            status: task.status.clone(),
            created_at: task.created_at,
            title: task.title.clone(),
            urgency: task.urgency.clone(),
            budget_paise: task.budget_paise,
        }
    }
}

/// Task with buyer/helper contact details and the selfie evidence captured
/// on arrival and completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    #[serde(default)]
    pub helper_name: Option<String>,
    #[serde(default)]
    pub helper_phone: Option<String>,
    #[serde(default)]
    pub arrival_selfie_url: Option<String>,
    #[serde(default)]
    pub arrival_selfie_lat: Option<f64>,
    #[serde(default)]
    pub arrival_selfie_lng: Option<f64>,
    #[serde(default)]
    pub arrival_selfie_address: Option<String>,
    #[serde(default)]
    pub arrival_selfie_captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_selfie_url: Option<String>,
    #[serde(default)]
    pub completion_selfie_lat: Option<f64>,
    #[serde(default)]
    pub completion_selfie_lng: Option<f64>,
    #[serde(default)]
    pub completion_selfie_address: Option<String>,
    #[serde(default)]
    pub completion_selfie_captured_at: Option<DateTime<Utc>>,
}

impl TaskDetail {
    /// Best available label for the buyer: name, then phone, then id.
    pub fn buyer_label(&self) -> &str {
        self.buyer_name
            .as_deref()
            .or(self.buyer_phone.as_deref())
            .unwrap_or(&self.task.buyer_id)
    }

    /// Best available label for the assigned helper, `-` when unassigned.
    pub fn helper_label(&self) -> &str {
        self.helper_name
            .as_deref()
            .or(self.helper_phone.as_deref())
            .or(self.task.assigned_helper_id.as_deref())
            .unwrap_or("-")
    }
}

/// Marketplace counters shown on the dashboard. Missing counters read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminSummary {
    pub pending_helpers: u64,
    pub searching_tasks: u64,
    pub assigned_tasks: u64,
    pub arrived_tasks: u64,
    pub started_tasks: u64,
    pub completed_tasks: u64,
    pub total_revenue_paise: i64,
}

impl AdminSummary {
    /// Tasks that are neither completed nor cancelled.
    pub fn active_tasks(&self) -> u64 {
        self.searching_tasks + self.assigned_tasks + self.arrived_tasks + self.started_tasks
    }

    /// Revenue in whole rupees, truncated.
    pub fn total_revenue_rupees(&self) -> i64 {
        self.total_revenue_paise / 100
    }
}

// ---------------------------------------------------------------------------
// Support
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: String,
    pub created_by_user_id: String,
    pub created_by_role: Role,
    #[serde(default)]
    pub created_by_phone: Option<String>,
    pub category: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub status: TicketStatus,
    pub priority: String,
    #[serde(default)]
    pub related_task_id: Option<String>,
    #[serde(default)]
    pub assignee_user_id: Option<String>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    pub id: String,
    pub author_type: String,
    #[serde(default)]
    pub author_user_id: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
}
