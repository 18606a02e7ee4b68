//!
//! src/errors.rs  Andrew Belles  Oct 15th, 2026
//!
//! Defines enums and methods of error conversion
//! for errors the dashboard surfaces to the user
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("config error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

/// Coarse classification shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    ServiceUnavailable,
    Connection,
    Timeout,
    Other
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::Validation(_)      => ErrorKind::Validation,
            DashboardError::NotFound(_)        => ErrorKind::NotFound,
            DashboardError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            DashboardError::Connection(_)      => ErrorKind::Connection,
            DashboardError::Timeout            => ErrorKind::Timeout,
            _ => ErrorKind::Other
        }
    }
}

// timeout is checked first, a connect timeout reports both
impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DashboardError::Timeout
        } else if e.is_connect() {
            DashboardError::Connection(e.to_string())
        } else {
            DashboardError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self { DashboardError::Parse(e.to_string()) }
}
