use crate::api::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing or invalid session token")]
    Unauthorized,

    #[error("session token has expired")]
    TokenExpired,

    #[error("current password is incorrect")]
    WrongPassword,

    #[error("password must be at least 8 characters")]
    WeakPassword,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AdminError::Unauthorized | AdminError::TokenExpired => StatusCode::UNAUTHORIZED,
            AdminError::WrongPassword | AdminError::WeakPassword => StatusCode::BAD_REQUEST,
            AdminError::Io(_) | AdminError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiResponse::<()>::error(status, self.to_string()).into_response()
    }
}
