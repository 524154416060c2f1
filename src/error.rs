use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CtError>;

#[derive(Error, Debug)]
pub enum CtError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Secp256k1 error: {0}")]
    Secp(#[from] secp256k1_zkp::Error),

    #[error("Secp256k1 error: {0}")]
    SecpUpstream(#[from] secp256k1_zkp::UpstreamError),
}

impl CtError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CtError::InvalidArgument(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        CtError::IllegalState(msg.into())
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        CtError::OutOfRange(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CtError::Internal(msg.into())
    }
}
