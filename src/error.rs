// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the fixed-step solvers.

use std::fmt;

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Solver error types.
#[derive(Debug)]
pub enum Error {
    /// Malformed evaluation points (unsorted, out of range, non-finite)
    InvalidGrid(String),
    /// Magnus order outside {1, 2, 3}
    UnsupportedOrder(u32),
    /// Shape of a state, generator sample or propagator does not conform
    DimensionMismatch {
        context: String,
        expected: String,
        actual: String,
    },
    /// Two mutually exclusive ways of specifying output points were given
    ConflictingArguments(String),
    /// A requested output point is not a grid breakpoint
    MissingPoint(f64),
    /// Unrecognised integration method name
    UnknownMethod(String),
    /// Numerical failure inside a kernel (non-finite input, singular system)
    Numerical(String),
    /// Argument validation error
    Validation(ValidationError),
    /// Invalid solver configuration
    Config(String),
    /// Failure reading a configuration file
    Io(std::io::Error),
    /// YAML (de)serialization failure
    Serialization(String),
}

impl Error {
    pub(crate) fn dimension_mismatch(
        context: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Error::DimensionMismatch {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidGrid(msg) => write!(f, "Invalid time grid: {}", msg),
            Error::UnsupportedOrder(order) => write!(
                f,
                "Unsupported Magnus order {}: only orders 1, 2 and 3 are supported",
                order
            ),
            Error::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "Dimension mismatch in {}: expected {}, got {}",
                context, expected, actual
            ),
            Error::ConflictingArguments(msg) => write!(f, "Conflicting arguments: {}", msg),
            Error::MissingPoint(t) => write!(f, "Time {} is not a grid breakpoint", t),
            Error::UnknownMethod(name) => write!(f, "Unknown integration method: {}", name),
            Error::Numerical(msg) => write!(f, "Numerical error: {}", msg),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
