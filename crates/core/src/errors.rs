//! Core error types for the Showroom inventory.
//!
//! These errors are transport-agnostic. The server crate maps them onto HTTP
//! status codes at the request boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for inventory operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing dataset is missing or could not be read.
    #[error("Data source unavailable: {0}")]
    DataSource(#[from] DataSourceError),

    /// The dataset was readable but structurally unusable.
    #[error("Failed to parse vehicle data: {0}")]
    Parse(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A well-formed request referenced a vehicle that is not in the dataset.
    #[error("Vehicle not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failures reading the backing dataset.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Data file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for request parameters.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required parameter '{0}' is missing")]
    MissingField(String),

    #[error("Invalid value '{value}' for parameter '{field}'")]
    InvalidValue { field: String, value: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
