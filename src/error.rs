//! Error types for the crypto library

use thiserror::Error;

/// Custom error type for cipher, hash and transform operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key length: expected {expected}, got {actual} bytes")]
    InvalidKeyLength { expected: String, actual: usize },

    #[error("Specified key is a known weak key and cannot be used")]
    WeakKey,

    #[error("Specified key is a known semi-weak key and cannot be used")]
    SemiWeakKey,

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(String),

    #[error("Invalid IV length: expected {expected}, got {actual} bytes")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("Padding is invalid and cannot be removed")]
    InvalidPadding,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Hash must be finalized before the hash value is retrieved")]
    NotYetComputed,

    #[error("Invalid feedback size: {0} bits")]
    InvalidFeedbackSize(u32),

    #[error("Invalid effective key size: {0} bits")]
    InvalidEffectiveKeySize(u32),

    #[error("Iteration count must be positive")]
    InvalidIterationCount,

    #[error("Requested {requested} bytes, at most {max} can be derived")]
    OutputTooLong { requested: usize, max: usize },

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Result type alias for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;
