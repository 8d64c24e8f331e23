//! Error types for schema building and document parsing

use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Coarse classification of a [`ConfigError`], for callers that branch on
/// the failure class rather than on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    UnknownField,
    UnsupportedType,
    InvalidDefault,
    MissingField,
    TypeMismatch,
    EmptyValue,
    OutOfRange,
    Rejected,
    Io,
    Decode,
    Settings,
}

/// Loader errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown field {field}: {context}")]
    UnknownField { field: String, context: String },

    #[error("The type of the {field} argument is not supported ({field}: {ty})")]
    UnsupportedType { field: String, ty: String },

    #[error("Invalid default value for the {field} argument (default: {default}): {source}")]
    InvalidDefault {
        field: String,
        default: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("Argument {field} was not provided and no default was given")]
    MissingField { field: String },

    #[error("The {field} argument should be {expected} ({field}: {value})")]
    TypeMismatch {
        field: String,
        expected: String,
        value: String,
    },

    #[error("The {field} argument should be a non-empty {expected} ({field}: {value})")]
    EmptyValue {
        field: String,
        expected: String,
        value: String,
    },

    #[error("The {field} argument should be within {bound} ({field}: {value})")]
    OutOfRange {
        field: String,
        bound: String,
        value: String,
    },

    #[error("Custom validation rejected the configuration: {0:#}")]
    Rejected(anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config_crate::ConfigError),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ConfigError::UnknownField { .. } => ErrorKind::UnknownField,
            ConfigError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            ConfigError::InvalidDefault { .. } => ErrorKind::InvalidDefault,
            ConfigError::MissingField { .. } => ErrorKind::MissingField,
            ConfigError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ConfigError::EmptyValue { .. } => ErrorKind::EmptyValue,
            ConfigError::OutOfRange { .. } => ErrorKind::OutOfRange,
            ConfigError::Rejected(_) => ErrorKind::Rejected,
            ConfigError::Io(_) => ErrorKind::Io,
            ConfigError::Json(_) => ErrorKind::Decode,
            ConfigError::Settings(_) => ErrorKind::Settings,
        }
    }

    /// Name of the offending field, for the kinds that carry one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownField { field, .. }
            | ConfigError::UnsupportedType { field, .. }
            | ConfigError::InvalidDefault { field, .. }
            | ConfigError::MissingField { field }
            | ConfigError::TypeMismatch { field, .. }
            | ConfigError::EmptyValue { field, .. }
            | ConfigError::OutOfRange { field, .. } => Some(field),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        ConfigError::InvalidArgument(msg.into())
    }
}
