//! Unified error types for the Aquajal PWA shell.
//!
//! Each message carries a stable code prefix so log lines can be grepped
//! by failure class.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the worker, the page agent and the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty asset list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid or unresolvable URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored entry could not be decoded.
    #[error("CACHE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),

    /// The request never produced a response (offline, DNS, TLS, timeout).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// A response arrived with a non-success status where one was required.
    #[error("HTTP_ERROR: status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Precaching the asset list failed; the generation was not created.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// The platform refused to show a notification.
    #[error("NOTIFICATION_FAILED: {0}")]
    NotificationFailed(String),

    /// The relay to the subscription endpoint failed.
    #[error("RELAY_FAILED: {0}")]
    RelayFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl Error {
    /// Whether the error means "no response at all", as opposed to a bad one.
    ///
    /// Fetch interception only substitutes the offline page for these.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
