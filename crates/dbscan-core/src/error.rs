use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Faults surfaced by a metadata store adapter.
///
/// Every adapter call fails with exactly one of these; no partial rows are
/// ever returned alongside one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("connection to metadata store failed: {0}")]
    Connection(String),

    #[error("metadata store call timed out")]
    Timeout,

    #[error("metadata query failed: {0}")]
    Query(String),

    #[error("malformed catalog data: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Table name is required")]
    MissingIdentifier,

    #[error("Invalid table name. Only alphanumeric characters and underscores are allowed.")]
    InvalidIdentifier(String),

    #[error("Table {0} doesn't exist in catalog!")]
    NotFound(String),

    #[error("Metadata store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable
    Client,
    /// The table is absent from the catalog
    NotFound,
    /// The service or its store failed
    Server,
}

impl Error {
    /// Helper for creating configuration errors
    ///
    /// # Example
    /// ```
    /// use dbscan_core::Error;
    /// let err = Error::config_error("database.url is not set");
    /// ```
    pub fn config_error(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingIdentifier | Error::InvalidIdentifier(_) => ErrorKind::Client,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::StoreUnavailable(_) | Error::Config(_) => ErrorKind::Server,
        }
    }
}
