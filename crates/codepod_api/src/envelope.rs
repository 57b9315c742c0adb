//! Response envelope and error-to-status mapping.
//!
//! # Invariants
//! - Success bodies serialize as `{ "success": true, "data": ... }`.
//! - Failure bodies serialize as `{ "success": false, "error": "..." }`.
//! - Storage/actor internals are logged, never echoed to the client.

use codepod_core::{ActorError, RepoKeyError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Client-visible failure of one façade call.
#[derive(Debug)]
pub enum ApiError {
    /// Required field missing/blank or malformed path parameter.
    Validation(String),
    /// Lenient read found nothing (`getIssue`, `getFileContent`).
    NotFound(&'static str),
    Actor(ActorError),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => STATUS_BAD_REQUEST,
            Self::NotFound(_) => STATUS_NOT_FOUND,
            Self::Actor(err) => match err {
                ActorError::AuthorNotFound(_) => STATUS_BAD_REQUEST,
                ActorError::IssueNotFound(_) | ActorError::FileNotFound(_) => STATUS_NOT_FOUND,
                ActorError::Store(_) | ActorError::Unavailable(_) | ActorError::Spawn(_) => {
                    STATUS_INTERNAL_ERROR
                }
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Actor(err) => err.code(),
        }
    }

    /// Message placed in the envelope's `error` field.
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound(message) => (*message).to_string(),
            Self::Actor(ActorError::AuthorNotFound(_)) => "Author not found".to_string(),
            Self::Actor(ActorError::IssueNotFound(_)) => "Issue not found".to_string(),
            Self::Actor(ActorError::FileNotFound(_)) => "File not found".to_string(),
            Self::Actor(_) => "Internal server error".to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound(message) => f.write_str(message),
            Self::Actor(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Actor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ActorError> for ApiError {
    fn from(value: ActorError) -> Self {
        Self::Actor(value)
    }
}

impl From<RepoKeyError> for ApiError {
    fn from(value: RepoKeyError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// `{ success, data }` / `{ success, error }` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Envelope plus the HTTP-style status the transport should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply<T> {
    pub status: u16,
    pub body: ApiResponse<T>,
}

impl<T> ApiReply<T> {
    pub fn is_success(&self) -> bool {
        self.body.success
    }

    pub fn data(&self) -> Option<&T> {
        self.body.data.as_ref()
    }
}

impl<T: Serialize> ApiReply<T> {
    /// Serializes the envelope body.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}
