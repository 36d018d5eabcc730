//! Error handling for the HandEMG workspace
//!
//! One error type shared by the loader, the spectral analyzer and the
//! figure renderers.

use std::fmt;

/// Result type alias for HandEMG operations
pub type HandEmgResult<T> = Result<T, HandEmgError>;

/// Error type for all HandEMG operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HandEmgError {
    /// Input file does not exist
    FileNotFound {
        /// Path that was requested
        path: String,
    },

    /// Malformed CSV content
    ParseError {
        /// Source the table was read from
        path: String,
        /// 1-based line number, when known
        line: Option<u64>,
        /// Parser message
        reason: String,
    },

    /// Input the loader could not provide; the cause has already been logged
    DataUnavailable {
        /// Path that was requested
        path: String,
    },

    /// Requested column is absent from a loaded table
    MissingColumn {
        /// Column that was requested
        column: String,
        /// Columns the table actually has
        available: Vec<String>,
    },

    /// Column exists but holds the wrong kind of values
    ColumnType {
        /// Column name
        column: String,
        /// Expected type description
        expected: &'static str,
        /// Inferred type description
        found: &'static str,
    },

    /// No spectral samples fall inside a frequency band
    EmptyBand {
        /// Band label
        band: String,
    },

    /// Invalid configuration value
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },

    /// Signal cannot be analysed (too short, non-finite samples, ...)
    InvalidSignal {
        /// Description of the signal issue
        reason: String,
    },

    /// Filesystem error other than a missing input
    Io {
        /// Error description
        reason: String,
    },

    /// Figure rendering failure
    Render {
        /// Backend error description
        reason: String,
    },
}

impl HandEmgError {
    /// Build a configuration error from any message
    pub fn config(reason: impl Into<String>) -> Self {
        HandEmgError::InvalidConfiguration { reason: reason.into() }
    }

    /// Build a rendering error from any displayable backend error
    pub fn render(err: impl fmt::Display) -> Self {
        HandEmgError::Render { reason: err.to_string() }
    }
}

impl fmt::Display for HandEmgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandEmgError::FileNotFound { path } => {
                write!(f, "File not found: '{}'", path)
            }
            HandEmgError::ParseError { path, line: Some(line), reason } => {
                write!(f, "Failed to parse '{}' at line {}: {}", path, line, reason)
            }
            HandEmgError::ParseError { path, line: None, reason } => {
                write!(f, "Failed to parse '{}': {}", path, reason)
            }
            HandEmgError::DataUnavailable { path } => {
                write!(f, "Data from '{}' is not available", path)
            }
            HandEmgError::MissingColumn { column, available } => {
                write!(f, "Column '{}' not found; available columns: [{}]",
                       column, available.join(", "))
            }
            HandEmgError::ColumnType { column, expected, found } => {
                write!(f, "Column '{}' has type {}, expected {}", column, found, expected)
            }
            HandEmgError::EmptyBand { band } => {
                write!(f, "No spectral data in band {}", band)
            }
            HandEmgError::InvalidConfiguration { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }
            HandEmgError::InvalidSignal { reason } => {
                write!(f, "Invalid signal: {}", reason)
            }
            HandEmgError::Io { reason } => {
                write!(f, "I/O error: {}", reason)
            }
            HandEmgError::Render { reason } => {
                write!(f, "Rendering failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for HandEmgError {}

impl From<std::io::Error> for HandEmgError {
    fn from(err: std::io::Error) -> Self {
        HandEmgError::Io { reason: err.to_string() }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::HandEmgError::InvalidConfiguration {
            reason: format!($($arg)*)
        }
    };
}
