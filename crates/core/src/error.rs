use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index build failed: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index query failed: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding backend {backend} failed: {details}")]
    Backend { backend: String, details: String },

    #[error("embedding backend returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding dimension {actual} != {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding {row} has a non-finite component at {column}")]
    NonFinite { row: usize, column: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("vector dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vectors must have at least one dimension")]
    ZeroDimension,
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
