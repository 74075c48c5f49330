use thiserror::Error;

/// Core error type for encode and decode operations
#[derive(Error, Debug)]
pub enum CodecError {
    /// IO errors from the underlying source or sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow errors from batch construction or concatenation
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet format errors (corrupt footer, unsupported encoding, ...)
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Type conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Invalid or unrecognized codec option
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsupported operation errors
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        CodecError::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        CodecError::Conversion(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        CodecError::InvalidArgument(msg.into())
    }

    /// Create a new unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        CodecError::Unsupported(msg.into())
    }
}
