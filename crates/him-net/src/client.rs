//! Authenticated calls to the HIM backend.
//!
//! [`ApiClient::fetch`] is the single choke point every backend call goes
//! through. It attaches the bearer token, disables caching, and folds every
//! possible outcome into an [`ApiResult`] so callers never deal with
//! transport errors directly.

use him_shared::protocol::Upload;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, upload: Upload },
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, upload: Upload) -> Self {
        FormField::File {
            name: name.into(),
            upload,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body<B> {
    Empty,
    Json(B),
    Multipart(Vec<FormField>),
}

/// Method, body and extra headers of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest<B = ()> {
    pub method: Method,
    pub body: Body<B>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest<()> {
    pub fn get() -> Self {
        Self::without_body(Method::GET)
    }

    pub fn delete() -> Self {
        Self::without_body(Method::DELETE)
    }

    /// A POST with no body, as used by the row actions.
    pub fn post_empty() -> Self {
        Self::without_body(Method::POST)
    }

    pub fn multipart(fields: Vec<FormField>) -> Self {
        Self {
            method: Method::POST,
            body: Body::Multipart(fields),
            headers: Vec::new(),
        }
    }

    fn without_body(method: Method) -> Self {
        Self {
            method,
            body: Body::Empty,
            headers: Vec::new(),
        }
    }
}

impl<B: Serialize> ApiRequest<B> {
    pub fn post(body: B) -> Self {
        Self {
            method: Method::POST,
            body: Body::Json(body),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn has_header(&self, name: &HeaderName) -> bool {
        self.headers
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name.as_str()))
    }
}

/// HTTP client bound to one backend base URL. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            base_url: config.base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `path` (relative to the base URL) and decode a JSON `T`.
    ///
    /// * transport failure, including a body that ends early:
    ///   [`ApiError::NetworkUnreachable`]
    /// * non-2xx: [`ApiError::Http`] with the body verbatim
    /// * 2xx with an empty body: `Ok(None)`
    /// * 2xx with a body that is not a `T`: [`ApiError::InvalidPayload`]
    pub async fn fetch<T, B>(
        &self,
        path: &str,
        request: ApiRequest<B>,
        token: Option<&str>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let (status, text) = self.send(path, request, token).await?;
        if text.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text).map(Some).map_err(|e| {
            warn!(path, error = %e, "backend payload did not match schema");
            ApiError::InvalidPayload {
                status: status.as_u16(),
                reason: e.to_string(),
            }
        })
    }

    /// Like [`fetch`](Self::fetch) for calls whose response body is never
    /// read: any 2xx succeeds, `Ok(Some(()))` if a body came back.
    pub async fn execute<B: Serialize>(
        &self,
        path: &str,
        request: ApiRequest<B>,
        token: Option<&str>,
    ) -> ApiResult<()> {
        let (_, text) = self.send(path, request, token).await?;
        Ok((!text.is_empty()).then_some(()))
    }

    /// Send the request and read the whole body of a 2xx response.
    async fn send<B: Serialize>(
        &self,
        path: &str,
        request: ApiRequest<B>,
        token: Option<&str>,
    ) -> Result<(StatusCode, String), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let is_multipart = matches!(request.body, Body::Multipart(_));
        let sets_content_type = request.has_header(&CONTENT_TYPE);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !sets_content_type && !is_multipart {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(body) => builder.json(&body),
            Body::Multipart(fields) => builder.multipart(build_form(fields)),
        };

        debug!(method = %request.method, path, "backend request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %request.method, path, error = %e, "backend unreachable");
                return Err(ApiError::NetworkUnreachable {
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status();
        // A body cut off mid-stream is a transport failure whatever the status.
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    path,
                    status = status.as_u16(),
                    error = %e,
                    "backend response body was cut off"
                );
                return Err(ApiError::NetworkUnreachable {
                    reason: e.to_string(),
                });
            }
        };

        if !status.is_success() {
            debug!(path, status = status.as_u16(), "backend returned failure");
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok((status, text))
    }
}

fn build_form(fields: Vec<FormField>) -> Form {
    fields.into_iter().fold(Form::new(), |form, field| match field {
        FormField::Text { name, value } => form.text(name, value),
        FormField::File { name, upload } => form.part(name, file_part(upload)),
    })
}

fn file_part(upload: Upload) -> Part {
    let part = || Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
    match upload.content_type.as_deref() {
        Some(mime) => part().mime_str(mime).unwrap_or_else(|e| {
            warn!(file = %upload.file_name, error = %e, "dropping invalid upload content type");
            part()
        }),
        None => part(),
    }
}
