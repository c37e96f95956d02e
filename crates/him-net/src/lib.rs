//! Outbound HTTP to the HIM backend.
//!
//! Everything the console asks of the backend goes through
//! [`ApiClient::fetch`], which returns an [`ApiResult`] instead of raising.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ApiClient, ApiRequest, Body, FormField};
pub use config::{normalize_base_url, ApiConfig};
pub use error::{ApiError, ApiResult, ConfigError};
