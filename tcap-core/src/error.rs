use thiserror::Error;

/// Main error type for TCAP codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TcapError {
    /// Fewer bytes are available than a header or length field declares
    #[error("Truncated buffer: need {needed} bytes, got {available}")]
    TruncatedBuffer { needed: usize, available: usize },

    /// Destination buffer cannot hold the encoded element
    #[error("Buffer too small: need {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),
}

impl TcapError {
    /// Shorthand for a [`TcapError::TruncatedBuffer`]
    pub fn truncated(needed: usize, available: usize) -> Self {
        TcapError::TruncatedBuffer { needed, available }
    }

    /// Shorthand for a [`TcapError::BufferTooSmall`]
    pub fn too_small(needed: usize, available: usize) -> Self {
        TcapError::BufferTooSmall { needed, available }
    }
}

/// Result type alias for TCAP codec operations
pub type TcapResult<T> = Result<T, TcapError>;
