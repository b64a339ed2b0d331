//! Wire-level decode errors.

use thiserror::Error;

/// Result alias for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// A decode-time failure.
///
/// Decoders fail fast: the first mismatch aborts the read. Initial-byte
/// errors name both what was expected and the byte found; unknown tags
/// carry the raw value so callers can preserve forward compatibility.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// The initial byte did not match the schema-expected form.
    #[error("expected {expected}, found initial byte {found:#04x}")]
    InitialByte {
        /// What the schema called for at this position.
        expected: &'static str,
        /// The initial byte actually read.
        found: u8,
    },

    /// The buffer ended inside an item.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A fixed-length array carried the wrong element count.
    #[error("expected array of {expected} elements, found {found}")]
    LengthMismatch {
        /// The schema-declared element count.
        expected: u64,
        /// The count in the wire header.
        found: u64,
    },

    /// An externally counted array was not terminated by `0xFF` after its
    /// last element.
    #[error("expected break (0xff) after externally counted elements, found {found:#04x}")]
    MissingBreak {
        /// The byte found where the break should be.
        found: u8,
    },

    /// A union or optional carried a tag no schema variant declares.
    #[error("unknown variant tag {tag}")]
    UnknownVariant {
        /// The tag value, preserved for the caller.
        tag: u64,
    },

    /// Additional info 28–30 (reserved) or an indefinite marker where a
    /// definite argument is required.
    #[error("malformed additional info in initial byte {byte:#04x}")]
    MalformedAdditionalInfo {
        /// The offending initial byte.
        byte: u8,
    },

    /// A break byte (`0xFF`) appeared where an item was expected.
    #[error("unexpected break (0xff) where an item was expected")]
    UnexpectedBreak,

    /// A decoded integer does not fit the schema-declared width.
    #[error("value {value} out of range for {ty}")]
    OutOfRange {
        /// The schema type the value was decoded for.
        ty: &'static str,
        /// The decoded value.
        value: i128,
    },

    /// A text string item held bytes that are not valid UTF-8.
    #[error("text item is not valid UTF-8")]
    InvalidUtf8,
}
