use him_net::ApiError;
use him_shared::protocol::{blank_to_none, BuyerSignupRequest, HelperKycSignup};
use him_shared::types::Role;
use him_shared::ErrorCode;
use him_store::SessionBackend;
use tracing::info;

use super::Mutation;
use crate::lifecycle::Mount;
use crate::session::SessionStore;

/// Confirmation shown after a successful signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupNotice {
    BuyerCreated,
    HelperSubmitted,
}

impl SignupNotice {
    /// Value of the `success` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupNotice::BuyerCreated => "buyer",
            SignupNotice::HelperSubmitted => "helper",
        }
    }

    pub fn from_query(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            Some("buyer") => Some(SignupNotice::BuyerCreated),
            Some("helper") => Some(SignupNotice::HelperSubmitted),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SignupNotice::BuyerCreated => "Buyer account created.",
            SignupNotice::HelperSubmitted => "Helper signup submitted for KYC review.",
        }
    }
}

/// Public signup forms for buyers and helpers. No session is needed and
/// none is created.
#[derive(Debug, Clone, Default)]
pub struct SignupPage {
    pub notice: Option<SignupNotice>,
    pub error: Option<ErrorCode>,
}

impl SignupPage {
    pub fn open() -> Self {
        Self::default()
    }

    pub async fn signup_buyer<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        email: &str,
        password: &str,
        phone: &str,
        display_name: &str,
    ) -> Mutation {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return self.fail(ErrorCode::BuyerRequired);
        }
        let request = BuyerSignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            phone: blank_to_none(phone),
            display_name: blank_to_none(display_name),
            role: Role::Buyer,
        };
        let result = store.admin().signup_buyer(&request).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => self.succeed(SignupNotice::BuyerCreated),
            Err(e) => self.fail(failure_code(&e, ErrorCode::BuyerFailed)),
        }
    }

    pub async fn signup_helper<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        signup: HelperKycSignup,
    ) -> Mutation {
        if !signup.is_complete() {
            return self.fail(ErrorCode::HelperRequired);
        }
        let result = store.admin().signup_helper_kyc(signup).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(_) => self.succeed(SignupNotice::HelperSubmitted),
            Err(e) => self.fail(failure_code(&e, ErrorCode::HelperFailed)),
        }
    }

    fn succeed(&mut self, notice: SignupNotice) -> Mutation {
        info!(kind = notice.as_str(), "signup submitted");
        self.notice = Some(notice);
        self.error = None;
        Mutation::Applied
    }

    fn fail(&mut self, code: ErrorCode) -> Mutation {
        self.notice = None;
        self.error = Some(code.clone());
        Mutation::Failed(code)
    }
}

fn failure_code(error: &ApiError, otherwise: ErrorCode) -> ErrorCode {
    if error.is_unreachable() {
        ErrorCode::BackendUnreachable
    } else {
        otherwise
    }
}
