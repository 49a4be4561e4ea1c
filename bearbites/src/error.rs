use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BearBitesError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),
}

impl IntoResponse for BearBitesError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            BearBitesError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            BearBitesError::UnknownLocation(_) => (StatusCode::NOT_FOUND, self.to_string()),
            BearBitesError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            BearBitesError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            BearBitesError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            BearBitesError::UpstreamStatus { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            BearBitesError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            BearBitesError::UrlParse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            BearBitesError::Pattern(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            BearBitesError::Cache(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            BearBitesError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            BearBitesError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            BearBitesError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            BearBitesError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BearBitesError>;
