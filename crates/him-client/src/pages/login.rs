use him_shared::{ErrorCode, LoginStep, Route};
use him_store::SessionBackend;

use super::{Mutation, PageOutcome};
use crate::lifecycle::Mount;
use crate::session::{Credentials, LoginError, SessionStore};

/// Login form state: phone entry, then OTP entry; password login is
/// available from either step.
#[derive(Debug, Clone)]
pub struct LoginPage {
    pub step: LoginStep,
    /// Phone the OTP was sent to, carried into the verify step.
    pub phone: Option<String>,
    pub dev_otp: Option<String>,
    pub error: Option<ErrorCode>,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            step: LoginStep::Phone,
            phone: None,
            dev_otp: None,
            error: None,
        }
    }
}

impl LoginPage {
    /// Signed-in admins are sent straight to the dashboard.
    pub fn open<B: SessionBackend>(store: &SessionStore<B>) -> PageOutcome<Self> {
        if store.is_authenticated() {
            return PageOutcome::Redirect(Route::Dashboard);
        }
        PageOutcome::Ready(Self::default())
    }

    pub async fn start_otp<B: SessionBackend>(
        &mut self,
        store: &SessionStore<B>,
        mount: &Mount,
        phone: &str,
    ) -> Mutation {
        let result = store.start_otp(phone).await;
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(challenge) => {
                self.step = LoginStep::Otp;
                self.phone = Some(challenge.phone);
                self.dev_otp = challenge.dev_otp;
                self.error = None;
                Mutation::Applied
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn verify<B: SessionBackend>(
        &mut self,
        store: &mut SessionStore<B>,
        mount: &Mount,
        otp: &str,
    ) -> Mutation {
        let Some(phone) = self.phone.clone() else {
            self.restart();
            self.error = Some(ErrorCode::MissingPhone);
            return Mutation::Failed(ErrorCode::MissingPhone);
        };
        let credentials = Credentials::Otp {
            phone,
            otp: otp.to_string(),
        };
        self.sign_in(store, mount, credentials).await
    }

    pub async fn password<B: SessionBackend>(
        &mut self,
        store: &mut SessionStore<B>,
        mount: &Mount,
        email: &str,
        password: &str,
    ) -> Mutation {
        let credentials = Credentials::Password {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.sign_in(store, mount, credentials).await
    }

    /// Back to the phone step, forgetting the pending OTP.
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    async fn sign_in<B: SessionBackend>(
        &mut self,
        store: &mut SessionStore<B>,
        mount: &Mount,
        credentials: Credentials,
    ) -> Mutation {
        let result = store.login(credentials).await.map(|_| ());
        if !mount.is_active() {
            return Mutation::Cancelled;
        }
        match result {
            Ok(()) => {
                self.error = None;
                Mutation::Redirect(Route::Dashboard)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: LoginError) -> Mutation {
        tracing::debug!(error = %error, "login step failed");
        let code = error.code();
        self.error = Some(code.clone());
        Mutation::Failed(code)
    }
}
