use std::fmt;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Connection,
    Timeout,
    Other,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NetworkKind::Connection => "connection error",
            NetworkKind::Timeout => "timeout",
            NetworkKind::Other => "request error",
        };
        f.write_str(label)
    }
}

/// Body of a rejected request, kept as JSON when the service sent JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(Value),
    Text(String),
}

impl ErrorBody {
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(text),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Json(value) => write!(f, "{value}"),
            ErrorBody::Text(text) if text.trim().is_empty() => f.write_str("<empty body>"),
            ErrorBody::Text(text) => f.write_str(text.trim()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CSV file not found at '{0}'")]
    FileNotFound(String),
    #[error("error reading CSV file: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("keychain error: {0}")]
    Keychain(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: ErrorBody },
    #[error("{kind}: {message}")]
    Network { kind: NetworkKind, message: String },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Load-time and setup errors end the run; per-record errors do not.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            AppError::FileNotFound(_)
                | AppError::Parse(_)
                | AppError::Config(_)
                | AppError::Keychain(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Unexpected(value.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        match value.kind() {
            csv::ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                AppError::FileNotFound(value.to_string())
            }
            _ => AppError::Parse(value.to_string()),
        }
    }
}

impl From<keyring::Error> for AppError {
    fn from(value: keyring::Error) -> Self {
        AppError::Keychain(value.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(value: toml::de::Error) -> Self {
        AppError::Config(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        let kind = if value.is_timeout() {
            NetworkKind::Timeout
        } else if value.is_connect() {
            NetworkKind::Connection
        } else if value.is_request() {
            NetworkKind::Other
        } else {
            return AppError::Unexpected(value.to_string());
        };

        AppError::Network {
            kind,
            message: value.to_string(),
        }
    }
}
