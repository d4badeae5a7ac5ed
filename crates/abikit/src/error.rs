//! ABI error types

use thiserror::Error;

/// Error returned by every fallible abikit operation.
///
/// Variants are grouped by the stage that raises them: type grammar,
/// encoding, decoding, and item resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    // ==================== Grammar ====================
    /// Type string does not match the ABI type grammar
    #[error("invalid ABI type: {0}")]
    InvalidType(String),

    /// `tuple` type declared without components
    #[error("type `{0}` requires components")]
    MissingComponents(String),

    /// Human-readable declaration could not be parsed
    #[error("parse error at position {position}: {message}")]
    Parse {
        /// What the parser expected
        message: String,
        /// Byte offset in the declaration
        position: usize,
    },

    // ==================== Encoding ====================
    /// Parameter and value counts differ
    #[error("ABI encoding params/values length mismatch: expected {expected} values, got {given}")]
    LengthMismatch {
        /// Number of parameters
        expected: usize,
        /// Number of values supplied
        given: usize,
    },

    /// Integer does not fit the declared width
    #[error("number {value} is not in safe {kind} range ({min} to {max})")]
    IntegerOutOfRange {
        /// Rendered value
        value: String,
        /// Declared type, e.g. `uint8`
        kind: String,
        /// Inclusive minimum
        min: String,
        /// Inclusive maximum
        max: String,
    },

    /// Fixed-size bytes value longer than its declared size
    #[error("size of bytes {given} does not match expected size {expected} for `bytes{expected}`")]
    BytesSizeMismatch {
        /// Declared size
        expected: usize,
        /// Actual size
        given: usize,
    },

    /// Address is not 20 bytes
    #[error("address {0} is invalid")]
    InvalidAddress(String),

    /// Struct value lacks one or more tuple components
    #[error("tuple value is missing component(s): {}", .names.join(", "))]
    MissingComponent {
        /// Names of the missing components
        names: Vec<String>,
    },

    /// Fixed-size array value with the wrong element count
    #[error("array length mismatch for type `{kind}`: expected {expected}, got {given}")]
    ArrayLengthMismatch {
        /// Declared array type
        kind: String,
        /// Declared length
        expected: usize,
        /// Number of elements supplied
        given: usize,
    },

    /// Value shape does not fit the parameter type at all
    #[error("value {value} is not a valid `{expected}`")]
    InvalidArgumentType {
        /// Parameter type
        expected: String,
        /// Rendered value
        value: String,
    },

    /// Hex string could not be decoded
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    // ==================== Decoding ====================
    /// Buffer shorter than the head of the parameter list
    #[error("data size of {given} bytes is too small for given parameters (need at least {expected})")]
    DataSizeTooSmall {
        /// Minimum size in bytes
        expected: usize,
        /// Buffer size in bytes
        given: usize,
    },

    /// Offset or length prefix points outside the buffer
    #[error("offset {offset} is out-of-bounds (size: {size})")]
    OffsetOutOfBounds {
        /// Offending position, saturated to `usize::MAX`
        offset: usize,
        /// Buffer size
        size: usize,
    },

    /// Aliased tail offsets would expand the output past the element budget
    #[error("decoding exceeds the limit of {limit} array elements")]
    ElementLimitExceeded {
        /// Element budget, equal to the input size in bytes
        limit: usize,
    },

    /// Selector or topic prefix is too short
    #[error("selector size is invalid: expected {expected} bytes, got {given}")]
    InvalidSelectorSize {
        /// Required size (4 or 32)
        expected: usize,
        /// Supplied size
        given: usize,
    },

    /// Bool word is neither 0 nor 1
    #[error("invalid boolean word: {0}")]
    InvalidBoolean(String),

    /// String payload is not UTF-8
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),

    // ==================== Items ====================
    /// No ABI item matches the query
    #[error("ABI item `{0}` not found")]
    ItemNotFound(String),

    /// Two overloads both accept the arguments but encode them differently
    #[error(
        "found ambiguous types in overloaded ABI items: `{first_type}` in `{first_signature}` \
         and `{second_type}` in `{second_signature}`"
    )]
    Ambiguity {
        /// Conflicting type in the first overload
        first_type: String,
        /// Signature of the first overload
        first_signature: String,
        /// Conflicting type in the second overload
        second_type: String,
        /// Signature of the second overload
        second_signature: String,
    },

    /// Call data or revert data does not start with the item's selector
    #[error("selector {given} does not match `{signature}` ({expected})")]
    SelectorMismatch {
        /// Item's selector, hex
        expected: String,
        /// Selector found in the data, hex
        given: String,
        /// Item's signature
        signature: String,
    },

    /// First log topic does not match the event's topic
    #[error("topic {given} does not match event `{signature}` ({expected})")]
    TopicMismatch {
        /// Event topic, hex
        expected: String,
        /// Topic found in the log, hex
        given: String,
        /// Event signature
        signature: String,
    },

    /// Log carries the wrong number of topics
    #[error("event `{signature}` expects {expected} topics, log has {given}")]
    TopicCountMismatch {
        /// Event signature
        signature: String,
        /// Topics required
        expected: usize,
        /// Topics present
        given: usize,
    },

    /// Deployment data does not start with the creation bytecode
    #[error("deployment data does not start with the creation bytecode for `{0}`")]
    BytecodeMismatch(String),

    /// JSON ABI could not be (de)serialized
    #[error("JSON ABI error: {0}")]
    Json(String),
}

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::Json(e.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = AbiError> = std::result::Result<T, E>;
