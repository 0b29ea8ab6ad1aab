//! Error taxonomy for the intake harness
//!
//! Three classes matter to the runner: fatal configuration problems (abort
//! before any browser launches), a missing fixture file (skip the whole run),
//! and per-record failures (fail that case, keep going).

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("no credentials found in environment or fallback file")]
    MissingCredentials,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("fixture spreadsheet not found: {0}")]
    FixtureMissing(String),

    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("timed out after {timeout:?} waiting for {selector}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("no option matching {wanted:?} in {selector}")]
    NoSuchOption { selector: String, wanted: String },

    #[error("assertion failed: expected {expected:?}, got {actual:?}")]
    AssertionFailed { expected: String, actual: String },

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// True for errors that should abort the run before a browser launches,
    /// as opposed to failing a single record's case.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            HarnessError::MissingCredentials | HarnessError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
