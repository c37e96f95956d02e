//! Request-scoped cookie jar.
//!
//! A [`CookieJar`] is built from the incoming `Cookie` header, records every
//! change made while handling the request, and renders those changes as
//! `Set-Cookie` header values for the response. Reads observe pending
//! changes, so a value written earlier in the same request is visible.

use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// Lifetime in seconds; `Some(0)` expires the cookie immediately.
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Cookie {
    /// An httpOnly, `SameSite=Lax` cookie scoped to `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
            http_only: true,
            same_site: SameSite::Lax,
            secure: false,
        }
    }

    /// A cookie that tells the browser to drop `name` at `path`.
    pub fn removal(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            max_age: Some(0),
            ..Self::new(name, "").with_path(path)
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn is_removal(&self) -> bool {
        self.max_age == Some(0)
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(max_age) = self.max_age {
            let _ = write!(out, "; Max-Age={max_age}");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        let _ = write!(out, "; SameSite={}", self.same_site.as_str());
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    incoming: BTreeMap<String, String>,
    changes: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one or more `Cookie` request header values.
    pub fn from_headers<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut incoming = BTreeMap::new();
        for header in values {
            for pair in header.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                // First occurrence wins, matching browser ordering by path specificity.
                incoming
                    .entry(name.to_string())
                    .or_insert_with(|| value.trim().trim_matches('"').to_string());
            }
        }
        Self {
            incoming,
            changes: Vec::new(),
        }
    }

    /// Current value of `name`, taking changes made in this request into account.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(change) = self.changes.iter().rev().find(|c| c.name == name) {
            return (!change.is_removal()).then_some(change.value.as_str());
        }
        self.incoming.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, cookie: Cookie) {
        self.changes
            .retain(|c| !(c.name == cookie.name && c.path == cookie.path));
        self.changes.push(cookie);
    }

    pub fn remove(&mut self, name: &str, path: &str) {
        self.set(Cookie::removal(name, path));
    }

    /// Changes recorded so far, in the order they were made.
    pub fn changes(&self) -> &[Cookie] {
        &self.changes
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.changes.iter().map(Cookie::to_header_value).collect()
    }
}
