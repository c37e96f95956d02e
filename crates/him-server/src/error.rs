use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use him_net::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A backend call failed; its status and body are passed through.
    #[error("Backend error ({status}): {body}")]
    Backend { status: StatusCode, body: String },

    #[error("Backend unreachable")]
    BackendUnreachable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for ServerError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NetworkUnreachable { .. } => ServerError::BackendUnreachable,
            ApiError::Http { status, body } => ServerError::Backend {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            },
            ApiError::InvalidPayload { .. } => ServerError::Internal(error.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Backend { status, body } => (*status, body.clone()),
            ServerError::BackendUnreachable => {
                (StatusCode::BAD_GATEWAY, "backend_unreachable".to_string())
            }
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
