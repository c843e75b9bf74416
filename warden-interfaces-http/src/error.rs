use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl From<warden_application::AppError> for HttpError {
    fn from(value: warden_application::AppError) -> Self {
        match value {
            warden_application::AppError::Unauthorized => HttpError::Unauthorized,
            warden_application::AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            warden_application::AppError::NotFound => HttpError::NotFound,
            warden_application::AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("bad request: {}", msg)),
            HttpError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
