//! Error types for the structmap core library
//!
//! Every failure the engine can report is a variant of [`Error`]. Variants
//! fall into the families described by [`ErrorKind`]; only the
//! optional-field family is ever downgraded to a silent skip, and only in
//! loose mode.

use crate::reflect::Kind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for structmap operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The source argument was absent or a nil reference
    #[error("Source must not be nil")]
    NilSource,

    /// The destination argument was absent or a nil reference
    #[error("Destination must not be nil")]
    NilDestination,

    /// The destination was not a pointer, so it cannot be written through
    #[error("Destination must be a pointer type, got {type_name}")]
    DestinationNotPointer { type_name: String },

    /// More than one options value was supplied
    #[error("Configuration error: only one options value may be supplied, got {count}")]
    TooManyOptions { count: usize },

    /// The destination expects a container or struct the source is not
    #[error("Shape mismatch: destination {dest_type} needs a {expected} source, got {source_type}")]
    ShapeMismatch {
        expected: Kind,
        source_type: String,
        dest_type: String,
    },

    /// Map key types differ; keys are never converted
    #[error("Map key types not equal: source {source_key}, destination {dest_key}")]
    MapKeyMismatch { source_key: String, dest_key: String },

    /// Two leaf types with no copy rule between them
    #[error("Incompatible leaf types: cannot map {source_type} into {dest_type}")]
    IncompatibleTypes {
        source_type: String,
        dest_type: String,
    },

    /// Strict mode: a destination field has no counterpart on the source
    #[error("Error mapping field {field}: source type {source_type} does not contain related field (destination type {dest_type})")]
    FieldNotFound {
        field: String,
        source_type: String,
        dest_type: String,
    },

    /// Strict mode: a destination field cannot be written
    #[error("Error mapping field {field}: field cannot be set (destination type {dest_type}, source type {source_type})")]
    UnsettableField {
        field: String,
        source_type: String,
        dest_type: String,
    },

    /// A panic raised while mapping, caught and converted
    #[error(
        "Internal fault mapping {}: {message} (destination type {dest_type}, source type {source_type})",
        .field.as_deref().map_or_else(|| "root value".to_string(), |name| format!("field {}", name))
    )]
    Fault {
        field: Option<String>,
        source_type: String,
        dest_type: String,
        message: String,
    },

    /// Misuse of the type table
    #[error("Type definition error: {message}")]
    Definition { message: String },

    /// A value that does not fit the type it was built for
    #[error("Invalid value for {type_name}: {message}")]
    InvalidValue { type_name: String, message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Families of [`Error`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad arguments at the entry point
    Precondition,
    /// The two shapes cannot be mapped at all
    ShapeMismatch,
    /// A single destination field could not be resolved or written
    OptionalField,
    /// A caught panic
    Fault,
    /// Misuse of the type table or value constructors
    Definition,
}

impl Error {
    /// Family this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NilSource
            | Error::NilDestination
            | Error::DestinationNotPointer { .. }
            | Error::TooManyOptions { .. } => ErrorKind::Precondition,
            Error::ShapeMismatch { .. }
            | Error::MapKeyMismatch { .. }
            | Error::IncompatibleTypes { .. } => ErrorKind::ShapeMismatch,
            Error::FieldNotFound { .. } | Error::UnsettableField { .. } => ErrorKind::OptionalField,
            Error::Fault { .. } => ErrorKind::Fault,
            Error::Definition { .. } | Error::InvalidValue { .. } => ErrorKind::Definition,
        }
    }

    /// Whether loose mode turns this error into a skip
    pub fn is_skippable(&self) -> bool {
        self.kind() == ErrorKind::OptionalField
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Precondition => write!(f, "precondition"),
            ErrorKind::ShapeMismatch => write!(f, "shape mismatch"),
            ErrorKind::OptionalField => write!(f, "optional field"),
            ErrorKind::Fault => write!(f, "fault"),
            ErrorKind::Definition => write!(f, "definition"),
        }
    }
}
