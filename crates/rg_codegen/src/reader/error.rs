use thiserror::Error;

/// Malformed or truncated input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReadError {
    #[error("unexpected end of buffer: needed {needed} byte(s), {remaining} remaining")]
    EndOfBuffer { needed: usize, remaining: usize },

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("packed whole number does not fit in 64 bits")]
    PackedOverflow,

    #[error("value {value} does not fit in `{target}`")]
    OutOfRange { value: u64, target: &'static str },

    #[error("invalid char scalar value {0:#x}")]
    InvalidChar(u32),

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("negative length {0}")]
    NegativeLength(i32),
}
