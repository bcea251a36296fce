pub mod account;
pub mod calendar;
pub mod dashboard;
pub mod emails;
pub mod meetings;
pub mod prospects;

use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use sdr_core::{EngagementError, Session};
use shared_types::{EmailMessage, ErrorResponse};
use std::fmt;

use crate::database::{email_records, Database};

/// Handler error carrying the HTTP mapping of an engagement failure.
#[derive(Debug)]
pub enum ApiError {
    Engagement(EngagementError),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Engagement(e) => write!(f, "{}", e),
            ApiError::Internal(message) => write!(f, "{}", message),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Engagement(EngagementError::AuthRequired) => StatusCode::UNAUTHORIZED,
            ApiError::Engagement(EngagementError::NotConnected) => StatusCode::CONFLICT,
            ApiError::Engagement(EngagementError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engagement(EngagementError::ExternalService { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Engagement(EngagementError::Parse(_))
            | ApiError::Engagement(EngagementError::Storage(_))
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

impl From<EngagementError> for ApiError {
    fn from(e: EngagementError) -> Self {
        ApiError::Engagement(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The dashboard forwards the user's session as `Authorization: Bearer <token>`.
pub fn session_from(req: &HttpRequest) -> Option<Session> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?;
    Session::new(token.trim())
}

/// Saves outbound records after the provider already acted on them. A
/// storage failure is logged and swallowed so the caller still sees the
/// outcome of the send.
pub async fn persist_emails(db: &Database, records: &[EmailMessage]) -> bool {
    if records.is_empty() {
        return true;
    }
    match email_records::upsert_emails(db.async_connection.clone(), records).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to persist {} email records: {}", records.len(), e);
            false
        }
    }
}
