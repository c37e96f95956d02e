//! Request and response bodies exchanged with the backend.
//!
//! Optional account fields are serialized as explicit `null` rather than
//! omitted: the backend distinguishes "clear this field" from "field not
//! sent", and the console always sends the full form.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::{AccountStatus, AuthUser, Role, TaskStatus, TicketStatus};

/// Trim a form value and map blank input to `None`.
pub fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpStartRequest {
    pub phone: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStartResponse {
    /// Only present when the backend runs with dev OTP echo enabled.
    #[serde(default)]
    pub dev_otp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub otp: String,
    pub role: Role,
}

/// Token pair issued by password login and OTP verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSignupRequest {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
}

/// A file attached to the helper KYC signup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Helper signup with KYC documents, sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperKycSignup {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub full_name: String,
    pub id_number: String,
    pub id_front: Upload,
    pub id_back: Upload,
    pub selfie: Upload,
}

impl HelperKycSignup {
    /// True when every mandatory text field and document is present.
    pub fn is_complete(&self) -> bool {
        [&self.email, &self.password, &self.full_name, &self.id_number]
            .iter()
            .all(|value| !value.trim().is_empty())
            && [&self.id_front, &self.id_back, &self.selfie]
                .iter()
                .all(|upload| !upload.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Admin mutations
// ---------------------------------------------------------------------------

/// Body for creating a buyer or helper account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
    pub status: Option<AccountStatus>,
}

impl NewAccount {
    /// Build from raw form input, mapping blank fields to `null`. A status
    /// this build does not recognise is still sent as typed.
    pub fn from_form(
        phone: &str,
        email: &str,
        display_name: &str,
        password: &str,
        status: &str,
    ) -> Self {
        Self {
            phone: blank_to_none(phone),
            email: blank_to_none(email),
            display_name: blank_to_none(display_name),
            password: blank_to_none(password),
            status: AccountStatus::from_input(status),
        }
    }
}

/// Body for updating a buyer or helper account. Passwords are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub status: Option<AccountStatus>,
}

impl AccountUpdate {
    pub fn from_form(phone: &str, email: &str, display_name: &str, status: &str) -> Self {
        Self {
            phone: blank_to_none(phone),
            email: blank_to_none(email),
            display_name: blank_to_none(display_name),
            status: AccountStatus::from_input(status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusChange {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatusChange {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReply {
    pub message: String,
}
