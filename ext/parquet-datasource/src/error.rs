use parquet_codec::CodecError;
use std::io;
use thiserror::Error;

/// Boxed error returned by deferred write-option producers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the datasource hooks
#[derive(Error, Debug)]
pub enum DatasourceError {
    #[error("File not found: {path}")]
    NotFound {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file system can only hand out forward-only streams for this path
    #[error("Cannot open {path} for random access: {reason}")]
    NotSeekable { path: String, reason: String },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to encode block: {0}")]
    Encode(#[source] CodecError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Write option producer failed: {0}")]
    OptionProducer(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, DatasourceError>;

impl DatasourceError {
    /// Classify an io error raised while touching `path`
    pub fn from_io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => DatasourceError::NotFound { path, source },
            io::ErrorKind::PermissionDenied => DatasourceError::PermissionDenied { path, source },
            _ => DatasourceError::Io { path, source },
        }
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        DatasourceError::Configuration(msg.into())
    }

    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            DatasourceError::NotFound { path, .. }
            | DatasourceError::PermissionDenied { path, .. }
            | DatasourceError::Io { path, .. }
            | DatasourceError::NotSeekable { path, .. }
            | DatasourceError::Decode { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Attach a path to io results
pub trait IoResultExt<T> {
    fn with_path(self, path: &str) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, path: &str) -> Result<T> {
        self.map_err(|e| DatasourceError::from_io(path, e))
    }
}
