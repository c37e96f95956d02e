use serde::{Deserialize, Serialize};

use crate::protocol::AuthTokens;
use crate::types::AuthUser;

/// Credentials and identity held by the console on behalf of an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    /// A session counts as authenticated as soon as it holds a non-blank
    /// access token; expiry is the backend's call.
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }
}

impl From<AuthTokens> for Session {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            user: tokens.user,
        }
    }
}
