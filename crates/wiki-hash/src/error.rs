/// Errors produced by ident and hex operations.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hex character at position {position}: '{character}'")]
    InvalidHex { position: usize, character: char },

    #[error("invalid hex length: expected {expected}, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("invalid ident length: expected {expected} bytes, got {actual}")]
    InvalidIdentLength { expected: usize, actual: usize },
}
