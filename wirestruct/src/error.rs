//! `wirestruct` error types.

use crate::codec::WireFormat;
use thiserror::Error;


/// A specialized result type for `wirestruct` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error associated with declaring, serializing or deserializing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The field has no reader, and the declaring type did not provide one.
    #[error("{type_name}.{field}: {operation} is not implemented")]
    NotImplemented {
        type_name: String,
        field: String,
        operation: &'static str,
    },
    /// A fixed-width read requested more bytes than the input holds.
    #[error("buffer underflow: needed {needed} bytes, {remaining} remaining")]
    Underflow { needed: usize, remaining: usize },
    /// A read crossed the end of the enclosing length-prefixed region.
    #[error("reading exceeds the length-prefixed region")]
    ExceedsLimit,
    /// A patch targeted bytes which have not been written yet.
    #[error("range {start}..{end} is outside the {len} written bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },
    /// A field was declared on a type which has already been finalized.
    #[error("type `{0}` is already finalized")]
    Finalized(String),
    /// The size of a length-prefixed region does not fit the prefix.
    #[error("length {length} of `{field}` exceeds the capacity of {format}")]
    LengthOverflow {
        field: String,
        format: WireFormat,
        length: usize,
    },
    /// An inclusive length prefix announced less than its own width.
    #[error("length {length} of `{field}` is smaller than the prefix itself")]
    LengthUnderflow { field: String, length: u64 },
    /// The value does not fit the wire width of the field.
    #[error("value of `{field}` does not fit {format}")]
    OutOfRange { field: String, format: WireFormat },
    /// The value kind does not match what the field holds.
    #[error("`{field}` expects {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    /// No field with this name is declared on the type.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// The name is already used by another field of the same type.
    #[error("field `{0}` is already declared")]
    DuplicateField(String),
    /// The field is `always` computed and cannot be assigned.
    #[error("field `{0}` is read-only")]
    ReadOnly(String),
    /// The combination of options is not valid for the field.
    #[error("invalid declaration of `{field}`: {reason}")]
    InvalidDeclaration {
        field: String,
        reason: &'static str,
    },
    /// Free-form failure, usually raised by custom readers.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates an [`Error::Message`] from anything printable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::Error;
    ///
    /// let error = Error::custom("bad magic");
    /// assert_eq!(error.to_string(), "bad magic");
    /// ```
    pub fn custom(msg: impl std::fmt::Display) -> Self {
        Self::Message(msg.to_string())
    }
}
