//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the console can start with zero
//! configuration for local development.

use std::net::SocketAddr;

use him_net::ApiConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// Backend the console talks to.
    /// Env: `HIM_API_BASE_URL`, then `API_BASE_URL`
    /// Default: `https://api.mysuperhero.xyz`
    pub api: ApiConfig,

    /// Whether a dev OTP echoed by the backend is kept in a cookie and shown
    /// on the verify step.
    /// Env: `DEV_SHOW_OTP` (true/false)
    /// Default: `false`
    pub dev_show_otp: bool,

    /// Mark every cookie `Secure`. Turn on behind HTTPS.
    /// Env: `COOKIE_SECURE` (true/false)
    /// Default: `false`
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 3000).into(),
            api: ApiConfig::default(),
            dev_show_otp: false,
            cookie_secure: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());
        config.api = ApiConfig::from_env();
        config
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.trim().parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(val) = lookup("DEV_SHOW_OTP") {
            config.dev_show_otp = parse_flag(&val);
        }

        if let Some(val) = lookup("COOKIE_SECURE") {
            config.cookie_secure = parse_flag(&val);
        }

        config
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
