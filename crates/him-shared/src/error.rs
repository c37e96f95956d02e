//! Error codes carried in the `error` query parameter after a redirect.
//!
//! Codes are short, stable identifiers (`otp_invalid`,
//! `approve_failed_500`, ...) that the target page decodes into a message
//! for the operator.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationAction {
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    Reopen,
    Status,
    Message,
}

impl MutationAction {
    const ALL: [MutationAction; 8] = [
        MutationAction::Create,
        MutationAction::Update,
        MutationAction::Delete,
        MutationAction::Approve,
        MutationAction::Reject,
        MutationAction::Reopen,
        MutationAction::Status,
        MutationAction::Message,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
            MutationAction::Approve => "approve",
            MutationAction::Reject => "reject",
            MutationAction::Reopen => "reopen",
            MutationAction::Status => "status",
            MutationAction::Message => "message",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            MutationAction::Create => "Create",
            MutationAction::Update => "Update",
            MutationAction::Delete => "Delete",
            MutationAction::Approve => "Approval",
            MutationAction::Reject => "Rejection",
            MutationAction::Reopen => "Reopening KYC",
            MutationAction::Status => "Status update",
            MutationAction::Message => "Sending the reply",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Login
    PhoneRequired,
    BackendUnreachable,
    OtpStartFailed,
    MissingPhone,
    OtpRequired,
    OtpInvalid,
    EmailPasswordRequired,
    InvalidCredentials,
    AdminOnly,
    // Signup
    BuyerRequired,
    BuyerFailed,
    HelperRequired,
    HelperFailed,
    /// `<action>_failed_<status>`; status 0 means the backend was unreachable.
    MutationFailed { action: MutationAction, status: u16 },
    Unknown(String),
}

impl ErrorCode {
    pub fn mutation(action: MutationAction, status: u16) -> Self {
        ErrorCode::MutationFailed { action, status }
    }

    /// Human-readable message for the operator.
    pub fn message(&self) -> String {
        match self {
            ErrorCode::PhoneRequired => "Enter a phone number.".into(),
            ErrorCode::BackendUnreachable => {
                "Could not reach the backend. Try again shortly.".into()
            }
            ErrorCode::OtpStartFailed => "Could not send an OTP to that number.".into(),
            ErrorCode::MissingPhone => "Your login session expired. Start again.".into(),
            ErrorCode::OtpRequired => "Enter the OTP you received.".into(),
            ErrorCode::OtpInvalid => "The OTP is invalid or expired.".into(),
            ErrorCode::EmailPasswordRequired => "Enter both email and password.".into(),
            ErrorCode::InvalidCredentials => "Invalid email or password.".into(),
            ErrorCode::AdminOnly => "This console is restricted to admin accounts.".into(),
            ErrorCode::BuyerRequired => "Email and password are required for a buyer.".into(),
            ErrorCode::BuyerFailed => "Buyer signup failed.".into(),
            ErrorCode::HelperRequired => {
                "Email, password, full name, ID number and all documents are required.".into()
            }
            ErrorCode::HelperFailed => "Helper signup failed.".into(),
            ErrorCode::MutationFailed { action, status: 0 } => {
                format!("{} failed: backend unreachable.", action.describe())
            }
            ErrorCode::MutationFailed { action, status } => {
                format!("{} failed (HTTP {status}).", action.describe())
            }
            ErrorCode::Unknown(code) => format!("Something went wrong ({code})."),
        }
    }

    fn fixed(&self) -> Option<&'static str> {
        Some(match self {
            ErrorCode::PhoneRequired => "phone_required",
            ErrorCode::BackendUnreachable => "backend_unreachable",
            ErrorCode::OtpStartFailed => "otp_start_failed",
            ErrorCode::MissingPhone => "missing_phone",
            ErrorCode::OtpRequired => "otp_required",
            ErrorCode::OtpInvalid => "otp_invalid",
            ErrorCode::EmailPasswordRequired => "email_password_required",
            ErrorCode::InvalidCredentials => "invalid_credentials",
            ErrorCode::AdminOnly => "admin_only",
            ErrorCode::BuyerRequired => "buyer_required",
            ErrorCode::BuyerFailed => "buyer_failed",
            ErrorCode::HelperRequired => "helper_required",
            ErrorCode::HelperFailed => "helper_failed",
            ErrorCode::MutationFailed { .. } | ErrorCode::Unknown(_) => return None,
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::MutationFailed { action, status } => {
                write!(f, "{}_failed_{status}", action.as_str())
            }
            ErrorCode::Unknown(code) => f.write_str(code),
            fixed => f.write_str(fixed.fixed().unwrap_or_default()),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        let known = [
            ErrorCode::PhoneRequired,
            ErrorCode::BackendUnreachable,
            ErrorCode::OtpStartFailed,
            ErrorCode::MissingPhone,
            ErrorCode::OtpRequired,
            ErrorCode::OtpInvalid,
            ErrorCode::EmailPasswordRequired,
            ErrorCode::InvalidCredentials,
            ErrorCode::AdminOnly,
            ErrorCode::BuyerRequired,
            ErrorCode::BuyerFailed,
            ErrorCode::HelperRequired,
            ErrorCode::HelperFailed,
        ];
        if let Some(found) = known.into_iter().find(|c| c.fixed() == Some(code)) {
            return Ok(found);
        }

        if let Some((action, status)) = code.split_once("_failed_") {
            let action = MutationAction::ALL
                .into_iter()
                .find(|a| a.as_str() == action);
            if let (Some(action), Ok(status)) = (action, status.parse::<u16>()) {
                return Ok(ErrorCode::MutationFailed { action, status });
            }
        }

        Ok(ErrorCode::Unknown(code.to_string()))
    }
}

/// Decode an optional `error` query parameter into a display message.
pub fn describe_error(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<ErrorCode>().ok().map(|code| code.message())
}
