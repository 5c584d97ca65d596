//! CircleCI API errors
//!
//! Every failure the client or a controller can report. Callers match on
//! the variant (and on [`HttpError`] fields) to decide tolerance.

use reqwest::StatusCode;
use thiserror::Error;

/// Message the follow endpoint returns when the repository has no commits yet
pub const BRANCH_NOT_FOUND: &str = "Branch not found";

/// A well-formed non-2xx response from the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub code: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StatusCode::NOT_FOUND.as_u16()
    }

    /// 400 "Branch not found": the project was followed but its repository is empty.
    pub fn is_branch_not_found(&self) -> bool {
        self.code == StatusCode::BAD_REQUEST.as_u16() && self.message == BRANCH_NOT_FOUND
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {0}")]
    Http(HttpError),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot upgrade state for {name}: {reason}")]
    Migration { name: String, reason: String },

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// The structured API error, if this is one
    pub fn http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.http().is_some_and(HttpError::is_not_found)
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        Self::Http(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Collapse a 404 into `None`; every other error is passed through.
pub fn absent_on_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
