use thiserror::Error;

/// Every failure the engagement core can report. Each one is scoped to the
/// single user action that triggered it.
#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("Please sign in first")]
    AuthRequired,

    #[error("Please connect your Google account first")]
    NotConnected,

    #[error("{message}")]
    ExternalService {
        status: Option<u16>,
        message: String,
    },

    /// Recovered locally wherever it occurs; never shown to the user.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, EngagementError>;

impl EngagementError {
    pub fn external(message: impl Into<String>) -> Self {
        EngagementError::ExternalService {
            status: None,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EngagementError::Validation(message.into())
    }

    /// Build an `ExternalService` error from a non-2xx collaborator response.
    /// FastAPI-style `{"detail": ...}` bodies win, then `{"message": ...}`,
    /// then the raw text.
    pub fn from_response(status: u16, body: &str) -> Self {
        EngagementError::ExternalService {
            status: Some(status),
            message: error_message_from_body(status, body),
        }
    }
}

fn error_message_from_body(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "message", "error"] {
            match value.get(field) {
                Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
                    return text.clone();
                }
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

impl From<redis::RedisError> for EngagementError {
    fn from(e: redis::RedisError) -> Self {
        EngagementError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for EngagementError {
    fn from(e: reqwest::Error) -> Self {
        EngagementError::ExternalService {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<rusqlite::Error> for EngagementError {
    fn from(e: rusqlite::Error) -> Self {
        EngagementError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for EngagementError {
    fn from(e: r2d2::Error) -> Self {
        EngagementError::Storage(e.to_string())
    }
}
