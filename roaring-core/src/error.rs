use thiserror::Error;

/// Errors raised while reading or writing the portable format
#[derive(Debug, Error)]
pub enum Error {
    /// The cookie matches neither the legacy nor the run-aware header
    #[error("malformed header: unrecognized cookie {cookie:#010x}")]
    MalformedHeader { cookie: u32 },

    /// The source ran out of bytes before the declared content was read
    #[error("truncated input: {requested} bytes requested at offset {offset}")]
    TruncatedInput { offset: u64, requested: usize },

    /// A recognized header carrying a reserved flag combination
    #[error("unsupported layout: {0}")]
    UnsupportedLayout(&'static str),

    /// Container content that no valid bitmap can produce
    #[error("invalid container: {0}")]
    InvalidContainer(&'static str),

    /// Failure of the underlying byte source or sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for serialization operations
pub type Result<T> = std::result::Result<T, Error>;
