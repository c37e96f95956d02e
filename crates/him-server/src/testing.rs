//! Router test helpers: an app wired to a [`MockBackend`] plus request and
//! response shorthands.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use him_net::ApiConfig;
use him_shared::types::Role;
use him_testkit::{MockBackend, TestServer};

use crate::api::{build_router, AppState};
use crate::config::ServerConfig;

const BOUNDARY: &str = "him-test-boundary";

/// Router talking to `mock`, with dev OTP display on.
pub async fn app(mock: &MockBackend) -> (Router, TestServer) {
    app_with(mock, true).await
}

pub async fn app_with(mock: &MockBackend, dev_show_otp: bool) -> (Router, TestServer) {
    let server = mock.spawn().await.unwrap();
    let config = ServerConfig {
        api: ApiConfig::new(&server.base_url).unwrap(),
        dev_show_otp,
        ..ServerConfig::default()
    };
    (build_router(AppState::new(config)), server)
}

/// `Cookie` header value for a freshly minted admin token.
pub async fn admin_cookie(mock: &MockBackend) -> String {
    let token = mock.issue_token(Role::Admin).await;
    format!("him_admin_access={token}")
}

fn with_cookie(
    builder: axum::http::request::Builder,
    cookie: Option<&str>,
) -> axum::http::request::Builder {
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::get(uri), cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::post(uri), cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::post(uri), cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A `multipart/form-data` POST with text `fields` and `(name, file_name, bytes)` files.
pub fn multipart_post(
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn location<B>(response: &Response<B>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn set_cookies<B>(response: &Response<B>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
