//! Backend base URL resolution.

use him_shared::constants::{DEFAULT_API_BASE_URL, ENV_API_BASE_URL, ENV_API_BASE_URL_LEGACY};

use crate::error::ConfigError;

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Resolve from `HIM_API_BASE_URL`, then `API_BASE_URL`, then the
    /// built-in default. Invalid values are logged and skipped.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        for key in [ENV_API_BASE_URL, ENV_API_BASE_URL_LEGACY] {
            let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match Self::new(&raw) {
                Ok(config) => {
                    tracing::debug!(source = key, base_url = %config.base_url, "resolved backend base URL");
                    return config;
                }
                Err(e) => tracing::warn!(source = key, error = %e, "ignoring backend base URL"),
            }
        }
        Self::default()
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme and host.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidBaseUrl(trimmed.to_string()));
    };
    if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        || rest.trim().is_empty()
        || rest.starts_with('/')
    {
        return Err(ConfigError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
