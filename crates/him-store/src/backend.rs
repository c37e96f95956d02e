//! Places a [`Session`] can be persisted to.
//!
//! The client-rendered console keeps its session in [`LocalStorage`]; the
//! server-rendered console keeps it in httpOnly cookies through a
//! [`CookieBackend`] wrapping the request's [`CookieJar`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use him_shared::constants::{
    ACCESS_COOKIE_MAX_AGE, COOKIE_ACCESS, COOKIE_REFRESH, COOKIE_USER, REFRESH_COOKIE_MAX_AGE,
    STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY,
};
use him_shared::types::AuthUser;
use him_shared::Session;

use crate::cookies::{Cookie, CookieJar};
use crate::database::LocalStorage;
use crate::error::Result;

/// Durable storage for the admin session.
///
/// `load` never fails because of malformed stored data: a user record that
/// cannot be decoded is dropped and the rest of the session is kept.
pub trait SessionBackend {
    fn load(&self) -> Result<Session>;
    fn persist(&mut self, session: &Session) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

fn decode_user(raw: &str) -> Option<AuthUser> {
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable stored user");
            None
        }
    }
}

impl SessionBackend for LocalStorage {
    fn load(&self) -> Result<Session> {
        Ok(Session {
            access_token: self.get_item(STORAGE_ACCESS_KEY)?,
            refresh_token: self.get_item(STORAGE_REFRESH_KEY)?,
            user: self
                .get_item(STORAGE_USER_KEY)?
                .as_deref()
                .and_then(decode_user),
        })
    }

    fn persist(&mut self, session: &Session) -> Result<()> {
        let user = session.user.as_ref().map(serde_json::to_string).transpose()?;
        self.put_or_remove(STORAGE_ACCESS_KEY, session.access_token.as_deref())?;
        self.put_or_remove(STORAGE_REFRESH_KEY, session.refresh_token.as_deref())?;
        self.put_or_remove(STORAGE_USER_KEY, user.as_deref())?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        for key in [STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY] {
            self.remove_item(key)?;
        }
        Ok(())
    }
}

/// Session cookies for the server-rendered console.
#[derive(Debug, Clone, Default)]
pub struct CookieBackend {
    jar: CookieJar,
    secure: bool,
}

impl CookieBackend {
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn jar_mut(&mut self) -> &mut CookieJar {
        &mut self.jar
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn put_or_remove(&mut self, name: &str, value: Option<String>, max_age: i64) {
        match value {
            Some(value) => self.jar.set(
                Cookie::new(name, value)
                    .with_max_age(max_age)
                    .with_secure(self.secure),
            ),
            None => self.jar.remove(name, "/"),
        }
    }
}

impl SessionBackend for CookieBackend {
    fn load(&self) -> Result<Session> {
        let user = self.jar.get(COOKIE_USER).and_then(|raw| {
            match URL_SAFE_NO_PAD.decode(raw.trim_end_matches('=')) {
                Ok(bytes) => decode_user(&String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding undecodable user cookie");
                    None
                }
            }
        });
        Ok(Session {
            access_token: self.jar.get(COOKIE_ACCESS).map(str::to_string),
            refresh_token: self.jar.get(COOKIE_REFRESH).map(str::to_string),
            user,
        })
    }

    fn persist(&mut self, session: &Session) -> Result<()> {
        let user = session
            .user
            .as_ref()
            .map(|user| serde_json::to_vec(user).map(|json| URL_SAFE_NO_PAD.encode(json)))
            .transpose()?;
        self.put_or_remove(COOKIE_ACCESS, session.access_token.clone(), ACCESS_COOKIE_MAX_AGE);
        self.put_or_remove(
            COOKIE_REFRESH,
            session.refresh_token.clone(),
            REFRESH_COOKIE_MAX_AGE,
        );
        self.put_or_remove(COOKIE_USER, user, REFRESH_COOKIE_MAX_AGE);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        for name in [COOKIE_ACCESS, COOKIE_REFRESH, COOKIE_USER] {
            self.jar.remove(name, "/");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use him_shared::types::Role;

    fn admin_session() -> Session {
        Session {
            access_token: Some("access-1".into()),
            refresh_token: Some("refresh-1".into()),
            user: Some(AuthUser {
                id: Some("u1".into()),
                email: Some("admin@example.com".into()),
                phone: None,
                role: Some(Role::Admin),
            }),
        }
    }

    #[test]
    fn test_local_storage_persist_load_clear() {
        let mut storage = LocalStorage::open_in_memory().unwrap();
        assert!(storage.load().unwrap().is_empty());

        storage.persist(&admin_session()).unwrap();
        assert_eq!(storage.load().unwrap(), admin_session());
        assert_eq!(
            storage.get_item(STORAGE_ACCESS_KEY).unwrap().as_deref(),
            Some("access-1")
        );

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_empty());
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_local_storage_drops_corrupt_user() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set_item(STORAGE_ACCESS_KEY, "tok").unwrap();
        storage.set_item(STORAGE_USER_KEY, "{not json").unwrap();

        let session = storage.load().unwrap();
        assert_eq!(session.access_token.as_deref(), Some("tok"));
        assert!(session.user.is_none());
    }

    #[test]
    fn test_cookie_backend_writes_expected_cookies() {
        let mut backend = CookieBackend::new(CookieJar::new(), true);
        backend.persist(&admin_session()).unwrap();

        let access = backend
            .jar()
            .changes()
            .iter()
            .find(|c| c.name == COOKIE_ACCESS)
            .cloned()
            .unwrap();
        assert_eq!(access.max_age, Some(ACCESS_COOKIE_MAX_AGE));
        assert!(access.http_only && access.secure);
        assert_eq!(access.path, "/");

        assert_eq!(backend.load().unwrap(), admin_session());
    }

    #[test]
    fn test_cookie_backend_reads_request_cookies() {
        let mut writer = CookieBackend::new(CookieJar::new(), false);
        writer.persist(&admin_session()).unwrap();
        let header = writer
            .jar()
            .changes()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        let reader = CookieBackend::new(CookieJar::from_headers([header.as_str()]), false);
        assert_eq!(reader.load().unwrap(), admin_session());
    }

    #[test]
    fn test_cookie_backend_clear_expires_all() {
        let jar = CookieJar::from_headers(["him_admin_access=a; him_admin_refresh=r"]);
        let mut backend = CookieBackend::new(jar, false);
        backend.clear().unwrap();

        assert!(backend.load().unwrap().is_empty());
        let headers = backend.jar().set_cookie_headers();
        assert_eq!(headers.len(), 3);
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }
}
