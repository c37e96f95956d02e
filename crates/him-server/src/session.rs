//! Request-scoped admin session.
//!
//! Every handler that needs the session takes a [`RequestSession`]: the
//! incoming `Cookie` headers are loaded into a [`SessionStore`] over a
//! [`CookieBackend`], and whatever the handler changed is written back as
//! `Set-Cookie` headers when the response is built.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use him_client::SessionStore;
use him_shared::constants::LOGIN_FLOW_COOKIE_MAX_AGE;
use him_shared::Route;
use him_store::{Cookie, CookieBackend, CookieJar};

use crate::api::AppState;

/// Path the login-flow cookies are scoped to.
const LOGIN_PATH: &str = "/login";

pub struct RequestSession {
    store: SessionStore<CookieBackend>,
    secure: bool,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(
            parts
                .headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        );
        let secure = state.config.cookie_secure;
        let mut store = SessionStore::new(CookieBackend::new(jar, secure), state.api.clone());
        store.hydrate();
        Ok(Self { store, secure })
    }
}

impl RequestSession {
    pub fn store(&self) -> &SessionStore<CookieBackend> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<CookieBackend> {
        &mut self.store
    }

    /// Login redirect when no access cookie is present.
    pub fn guard(&self) -> Result<(), Route> {
        match self.store.current_token() {
            Some(_) => Ok(()),
            None => Err(Route::LOGIN),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.store.backend().jar().get(name)
    }

    /// Set a short-lived cookie visible only to the login pages.
    pub fn set_login_cookie(&mut self, name: &str, value: &str) {
        let cookie = Cookie::new(name, value)
            .with_path(LOGIN_PATH)
            .with_max_age(LOGIN_FLOW_COOKIE_MAX_AGE)
            .with_secure(self.secure);
        self.store.backend_mut().jar_mut().set(cookie);
    }

    pub fn remove_login_cookie(&mut self, name: &str) {
        self.store.backend_mut().jar_mut().remove(name, LOGIN_PATH);
    }

    /// `303 See Other` to `location`, carrying any cookie changes.
    pub fn redirect(self, location: &str) -> Response {
        self.finish(Redirect::to(location))
    }

    /// Attach pending `Set-Cookie` headers to `response`.
    pub fn finish(self, response: impl IntoResponse) -> Response {
        let jar = self.store.teardown().into_jar();
        let mut response = response.into_response();
        for value in jar.set_cookie_headers() {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "dropping unencodable cookie"),
            }
        }
        response
    }
}
