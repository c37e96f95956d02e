//! Session/token store.
//!
//! [`SessionStore`] owns the current [`Session`] and writes every change
//! through to its [`SessionBackend`] before updating memory, so a failed
//! write never leaves the two out of step.

use him_net::{ApiClient, ApiError, ApiRequest};
use him_shared::constants::endpoints;
use him_shared::protocol::{
    AuthTokens, OtpStartRequest, OtpStartResponse, OtpVerifyRequest, PasswordLoginRequest,
};
use him_shared::types::Role;
use him_shared::{ErrorCode, Session};
use him_store::{SessionBackend, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::admin::AdminApi;

/// What an admin signs in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { email: String, password: String },
    Otp { phone: String, otp: String },
}

/// Result of starting an OTP login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub phone: String,
    /// Echoed by backends running with dev OTP enabled.
    pub dev_otp: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("phone number is required")]
    PhoneRequired,

    #[error("one-time code is required")]
    OtpRequired,

    #[error("email and password are required")]
    EmailPasswordRequired,

    #[error("backend unreachable")]
    BackendUnreachable,

    #[error("could not start OTP login: {0}")]
    OtpStartFailed(ApiError),

    #[error("one-time code rejected: {0}")]
    OtpInvalid(ApiError),

    #[error("credentials rejected: {0}")]
    InvalidCredentials(ApiError),

    #[error("login response was not understood: {0}")]
    InvalidPayload(String),

    #[error("account is not an admin")]
    AdminOnly,

    #[error("could not persist session: {0}")]
    Storage(#[from] StoreError),
}

impl LoginError {
    /// Redirect code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            LoginError::PhoneRequired => ErrorCode::PhoneRequired,
            LoginError::OtpRequired => ErrorCode::OtpRequired,
            LoginError::EmailPasswordRequired => ErrorCode::EmailPasswordRequired,
            LoginError::BackendUnreachable => ErrorCode::BackendUnreachable,
            LoginError::OtpStartFailed(_) => ErrorCode::OtpStartFailed,
            LoginError::OtpInvalid(_) => ErrorCode::OtpInvalid,
            LoginError::InvalidCredentials(_) => ErrorCode::InvalidCredentials,
            LoginError::InvalidPayload(_) => ErrorCode::Unknown("invalid_json".to_string()),
            LoginError::AdminOnly => ErrorCode::AdminOnly,
            LoginError::Storage(_) => ErrorCode::Unknown("session_storage_failed".to_string()),
        }
    }
}

pub struct SessionStore<B: SessionBackend> {
    backend: B,
    api: ApiClient,
    session: Session,
}

impl<B: SessionBackend> SessionStore<B> {
    /// A store with an empty in-memory session; call [`hydrate`](Self::hydrate)
    /// to pick up persisted state.
    pub fn new(backend: B, api: ApiClient) -> Self {
        Self {
            backend,
            api,
            session: Session::empty(),
        }
    }

    /// Reload the session from the backend. Never fails: unreadable storage
    /// yields an empty session.
    pub fn hydrate(&mut self) -> &Session {
        self.session = match self.backend.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "could not load persisted session, starting empty");
                Session::empty()
            }
        };
        &self.session
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The access token, if one is held and non-blank.
    pub fn current_token(&self) -> Option<&str> {
        self.session
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Typed admin calls authorised with the current token.
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(&self.api, self.current_token())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Ask the backend to send a one-time code to `phone`.
    pub async fn start_otp(&self, phone: &str) -> Result<OtpChallenge, LoginError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(LoginError::PhoneRequired);
        }

        let body = OtpStartRequest {
            phone: phone.to_string(),
            role: Role::Admin,
        };
        let response: Option<OtpStartResponse> = self
            .api
            .fetch(endpoints::OTP_START, ApiRequest::post(&body), None)
            .await
            .map_err(|e| match e {
                e if e.is_unreachable() => LoginError::BackendUnreachable,
                e => LoginError::OtpStartFailed(e),
            })?;

        info!(phone, "otp login started");
        Ok(OtpChallenge {
            phone: phone.to_string(),
            dev_otp: response.and_then(|r| r.dev_otp),
        })
    }

    /// Exchange credentials for tokens and persist them.
    ///
    /// Only ADMIN accounts are accepted. On any error the current session is
    /// left as it was.
    pub async fn login(&mut self, credentials: Credentials) -> Result<&Session, LoginError> {
        let is_otp = matches!(credentials, Credentials::Otp { .. });
        let result = match credentials {
            Credentials::Password { email, password } => {
                let email = email.trim().to_string();
                let password = password.trim().to_string();
                if email.is_empty() || password.is_empty() {
                    return Err(LoginError::EmailPasswordRequired);
                }
                let body = PasswordLoginRequest { email, password };
                self.api
                    .fetch::<AuthTokens, _>(endpoints::PASSWORD_LOGIN, ApiRequest::post(&body), None)
                    .await
            }
            Credentials::Otp { phone, otp } => {
                let phone = phone.trim().to_string();
                let otp = otp.trim().to_string();
                if phone.is_empty() {
                    return Err(LoginError::PhoneRequired);
                }
                if otp.is_empty() {
                    return Err(LoginError::OtpRequired);
                }
                let body = OtpVerifyRequest {
                    phone,
                    otp,
                    role: Role::Admin,
                };
                self.api
                    .fetch::<AuthTokens, _>(endpoints::OTP_VERIFY, ApiRequest::post(&body), None)
                    .await
            }
        };

        let tokens = match result {
            Ok(Some(tokens)) => tokens,
            Ok(None) => return Err(LoginError::InvalidPayload("empty response".to_string())),
            Err(e) if e.is_unreachable() => return Err(LoginError::BackendUnreachable),
            Err(ApiError::InvalidPayload { reason, .. }) => {
                return Err(LoginError::InvalidPayload(reason))
            }
            Err(e) if is_otp => return Err(LoginError::OtpInvalid(e)),
            Err(e) => return Err(LoginError::InvalidCredentials(e)),
        };

        if !tokens.user.as_ref().is_some_and(|user| user.is_admin()) {
            warn!(role = ?tokens.user.as_ref().and_then(|u| u.role.as_ref()), "rejected non-admin login");
            return Err(LoginError::AdminOnly);
        }

        let session = Session::from(tokens);
        self.backend.persist(&session)?;
        self.session = session;
        info!(
            user_id = ?self.session.user.as_ref().and_then(|u| u.id.as_deref()),
            "admin signed in"
        );
        Ok(&self.session)
    }

    /// Forget all credentials. Safe to call repeatedly.
    ///
    /// Memory is cleared even if the backend cannot be written.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.session = Session::empty();
        self.backend.clear()?;
        info!("admin signed out");
        Ok(())
    }

    /// End the store's lifetime, handing back the backend.
    pub fn teardown(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use him_net::ApiConfig;
    use him_store::LocalStorage;
    use him_testkit::{MockBackend, ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_PHONE, DEV_OTP};

    use super::*;

    async fn store_for(backend: &MockBackend) -> (SessionStore<LocalStorage>, him_testkit::TestServer) {
        let server = backend.spawn().await.unwrap();
        let api = ApiClient::new(ApiConfig::new(&server.base_url).unwrap());
        let storage = LocalStorage::open_in_memory().unwrap();
        (SessionStore::new(storage, api), server)
    }

    #[tokio::test]
    async fn test_logout_twice_leaves_empty_session() {
        let mock = MockBackend::new();
        let (mut store, _server) = store_for(&mock).await;

        store.logout().unwrap();
        assert!(store.session().is_empty());
        store.logout().unwrap();
        assert!(store.session().is_empty());
        assert!(store.hydrate().is_empty());
    }

    #[tokio::test]
    async fn test_password_login_then_logout() {
        let mock = MockBackend::new();
        let (mut store, _server) = store_for(&mock).await;

        store
            .login(Credentials::Password {
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .unwrap();
        assert!(store.is_authenticated());
        assert!(store.current_token().is_some());

        // Survives a reload from storage.
        assert!(store.hydrate().is_authenticated());

        store.logout().unwrap();
        assert!(!store.is_authenticated());
        assert!(!store.hydrate().is_authenticated());
    }

    #[tokio::test]
    async fn test_session_survives_reopening_storage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.db");
        let mock = MockBackend::new();
        let server = mock.spawn().await.unwrap();
        let api = ApiClient::new(ApiConfig::new(&server.base_url).unwrap());

        let mut store = SessionStore::new(LocalStorage::open_at(&path).unwrap(), api.clone());
        store
            .login(Credentials::Password {
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .unwrap();
        let token = store.current_token().map(str::to_string);
        drop(store.teardown());

        let mut reopened = SessionStore::new(LocalStorage::open_at(&path).unwrap(), api);
        assert_eq!(reopened.hydrate().access_token, token);
        assert!(reopened.session().user.as_ref().is_some_and(|u| u.is_admin()));
    }

    #[tokio::test]
    async fn test_otp_dev_flow_yields_admin() {
        let mock = MockBackend::with_dev_otp();
        let (mut store, _server) = store_for(&mock).await;

        let challenge = store.start_otp(ADMIN_PHONE).await.unwrap();
        assert_eq!(challenge.dev_otp.as_deref(), Some(DEV_OTP));

        let session = store
            .login(Credentials::Otp {
                phone: ADMIN_PHONE.into(),
                otp: challenge.dev_otp.unwrap(),
            })
            .await
            .unwrap();
        assert!(session.user.as_ref().is_some_and(|u| u.is_admin()));
    }

    #[tokio::test]
    async fn test_wrong_otp_leaves_session_untouched() {
        let mock = MockBackend::with_dev_otp();
        let (mut store, _server) = store_for(&mock).await;

        store.start_otp(ADMIN_PHONE).await.unwrap();
        let err = store
            .login(Credentials::Otp {
                phone: ADMIN_PHONE.into(),
                otp: "000000".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);
        assert!(store.session().is_empty());
        assert!(store.hydrate().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_is_rejected_without_persisting() {
        let mock = MockBackend::new();
        let (mut store, _server) = store_for(&mock).await;

        let err = store
            .login(Credentials::Password {
                email: him_testkit::HELPER_EMAIL.into(),
                password: him_testkit::HELPER_PASSWORD.into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::AdminOnly));
        assert!(store.hydrate().is_empty());
    }

    #[tokio::test]
    async fn test_input_validation_happens_before_network() {
        let mock = MockBackend::new();
        let (mut store, _server) = store_for(&mock).await;

        let err = store
            .login(Credentials::Password {
                email: " ".into(),
                password: "x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmailPasswordRequired);
        assert!(matches!(
            store.start_otp("  ").await,
            Err(LoginError::PhoneRequired)
        ));
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = ApiClient::new(ApiConfig::new(&format!("http://{addr}")).unwrap());
        let mut store = SessionStore::new(LocalStorage::open_in_memory().unwrap(), api);

        let err = store
            .login(Credentials::Password {
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BackendUnreachable);
    }
}
