//! Structured error types for the credential codec.
//!
//! Every failure is local and permanent: a failed encode returns no bytes,
//! a failed decode returns no value.

use thiserror::Error;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Structured error type for the codec.
///
/// # Example
/// ```rust
/// use credgate_core::error::CodecError;
/// use credgate_core::primitive::{Primitive, PrimitiveType};
///
/// let err = Primitive::integer(PrimitiveType::U8, 256).unwrap_err();
/// assert!(matches!(err, CodecError::OutOfRange { .. }));
/// assert_eq!(err.error_code(), 1000);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Integer constructed outside the bounds of its declared type
    #[error("Value {value} out of range for {ty}: expected {min}..={max}")]
    OutOfRange {
        ty: String,
        value: i128,
        min: i128,
        max: i128,
    },

    /// Discriminant byte does not index a declared variant
    #[error("Unknown variant {discriminant} for {ty} ({count} variants declared)")]
    UnknownVariant {
        ty: String,
        discriminant: u8,
        count: usize,
    },

    /// Type name not present in the registry
    #[error("Unknown type '{name}'")]
    UnknownType {
        name: String,
    },

    /// Input shorter than required
    #[error("Truncated buffer: need {needed} bytes, have {available}")]
    TruncatedBuffer {
        needed: usize,
        available: usize,
    },

    /// Length prefix implies more data than the buffer or capacity allows
    #[error("Malformed length {declared}: only {limit} allowed")]
    MalformedLength {
        declared: u64,
        limit: u64,
    },

    /// Type registered twice
    #[error("Type '{name}' is already registered")]
    DuplicateType {
        name: String,
    },

    /// Value kind or width differs from the declared type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
    },

    /// Struct or variant fields differ from the descriptor
    #[error("Field mismatch in {ty}: expected '{expected}', found '{found}'")]
    FieldMismatch {
        ty: String,
        expected: String,
        found: String,
    },

    /// Union built from zero or several candidate variants
    #[error("Expected exactly one active variant for {ty}, got {count}")]
    InvalidVariantCount {
        ty: String,
        count: usize,
    },

    /// Descriptor cannot be encoded on the wire
    #[error("Invalid descriptor for '{name}': {message}")]
    InvalidDescriptor {
        name: String,
        message: String,
    },

    /// Flag byte other than 0 or 1
    #[error("Invalid {what} byte {value}")]
    InvalidTag {
        what: &'static str,
        value: u8,
    },

    /// Logical length larger than the reserved capacity
    #[error("Length {len} exceeds reserved capacity {capacity}")]
    CapacityExceeded {
        len: usize,
        capacity: usize,
    },

    /// Decode finished before the end of the input
    #[error("{remaining} trailing bytes after decode")]
    TrailingBytes {
        remaining: usize,
    },
}

impl CodecError {
    pub(crate) fn unknown_type(name: impl Into<String>) -> Self {
        CodecError::UnknownType { name: name.into() }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Get a numeric error code for client-side handling.
    pub fn error_code(&self) -> u32 {
        match self {
            CodecError::OutOfRange { .. } => 1000,
            CodecError::UnknownVariant { .. } => 1001,
            CodecError::UnknownType { .. } => 1002,
            CodecError::TruncatedBuffer { .. } => 1003,
            CodecError::MalformedLength { .. } => 1004,
            CodecError::DuplicateType { .. } => 1005,
            CodecError::TypeMismatch { .. } => 1006,
            CodecError::FieldMismatch { .. } => 1007,
            CodecError::InvalidVariantCount { .. } => 1008,
            CodecError::InvalidDescriptor { .. } => 1009,
            CodecError::InvalidTag { .. } => 1010,
            CodecError::CapacityExceeded { .. } => 1011,
            CodecError::TrailingBytes { .. } => 1012,
        }
    }
}
