use thiserror::Error;

/// Failures raised while parsing an ABI or encoding/decoding call data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Malformed ABI: {0}")]
    MalformedAbi(String),

    #[error("Unsupported ABI type '{0}'")]
    UnsupportedType(String),

    #[error("Data too short: need at least {required} bytes, got {actual}")]
    DataTooShort { required: usize, actual: usize },

    #[error("No matching function found for selector 0x{}", hex::encode(.0))]
    NoMatchingFunction([u8; 4]),

    #[error(
        "Selector 0x{} is ambiguous: declared by {}",
        hex::encode(.selector),
        .functions.join(", ")
    )]
    AmbiguousSelector {
        selector: [u8; 4],
        functions: Vec<String>,
    },

    #[error("Failed to unpack parameter #{index}: {reason}")]
    Unpack { index: usize, reason: String },

    #[error("Function '{0}' not found in contract ABI")]
    FunctionNotFound(String),

    #[error("Argument count mismatch for '{function}': expected {expected}, got {actual}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid address for parameter #{index}: '{value}'")]
    InvalidAddress { index: usize, value: String },

    #[error("Invalid integer for parameter #{index} ({ty}): '{value}'")]
    InvalidInteger {
        index: usize,
        ty: String,
        value: String,
    },

    #[error("Invalid boolean for parameter #{index}: '{value}' (expected true or false)")]
    InvalidBool { index: usize, value: String },

    #[error("Invalid {ty} for parameter #{index}: {reason}")]
    InvalidFixedBytes {
        index: usize,
        ty: String,
        reason: String,
    },

    #[error("Encoding parameter #{index} of type '{ty}' from a string is not supported")]
    UnsupportedEncodeType { index: usize, ty: String },

    #[error("Value for parameter #{index} does not match type '{ty}'")]
    TypeMismatch { index: usize, ty: String },

    #[error("Invalid hex data: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::InvalidHex(e.to_string())
    }
}

pub type AbiResult<T> = Result<T, AbiError>;
