use std::path::PathBuf;

/// All errors produced by revfs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a repository: {0}")]
    NotARepository(String),

    #[error("revision not found: {0}")]
    RefNotFound(String),

    #[error("ambiguous revision: {0}")]
    AmbiguousRevision(String),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("malformed pointer record: {0}")]
    PointerMalformed(String),

    #[error("large-object payload missing: {0}")]
    PayloadMissing(String),

    #[error("large-object payload hash mismatch: expected {expected}, got {actual}")]
    PayloadHashMismatch { expected: String, actual: String },

    #[error("diff input too large: {0}")]
    DiffTooLarge(String),

    #[error("unsupported endpoint: {0}")]
    UnsupportedEndpoint(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("git error: {0}")]
    Git(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn not_a_repository(path: impl Into<String>) -> Self {
        Self::NotARepository(path.into())
    }

    pub fn ref_not_found(spec: impl Into<String>) -> Self {
        Self::RefNotFound(spec.into())
    }

    pub fn ambiguous_revision(spec: impl Into<String>) -> Self {
        Self::AmbiguousRevision(spec.into())
    }

    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound(path.into())
    }

    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn pointer_malformed(msg: impl Into<String>) -> Self {
        Self::PointerMalformed(msg.into())
    }

    pub fn payload_missing(oid: impl Into<String>) -> Self {
        Self::PayloadMissing(oid.into())
    }

    pub fn diff_too_large(msg: impl Into<String>) -> Self {
        Self::DiffTooLarge(msg.into())
    }

    pub fn unsupported_endpoint(msg: impl Into<String>) -> Self {
        Self::UnsupportedEndpoint(msg.into())
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn git(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Git(Box::new(err))
    }

    pub fn git_msg(msg: impl Into<String>) -> Self {
        Self::Git(msg.into().into())
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.into().display(), err),
        ))
    }
}
