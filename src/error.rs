//! Application-level error type.
//!
//! Module-local failures (`SourceError`, `RegressionError`) are converted into
//! `AppError` at the edges so the binary can map them to an exit code.

use crate::io::source::SourceError;

/// Bad input or configuration.
pub const EXIT_INPUT: u8 = 2;
/// No usable data after normalization.
pub const EXIT_NO_DATA: u8 = 3;
/// A data source could not be read or fetched.
pub const EXIT_SOURCE: u8 = 4;
/// The HTTP server failed to start or crashed.
pub const EXIT_SERVER: u8 = 5;

#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::new(EXIT_SOURCE, err.to_string())
    }
}
