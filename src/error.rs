//! Error types

use thiserror::Error;

/// Boxed error returned by external collaborators (network engine, SASL exchange)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Connection string names a scheme this crate does not understand
    #[error("unsupported scheme '{0}': expected couchbase, couchbases, or http")]
    UnsupportedScheme(String),

    /// Connection string could not be parsed
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// TLS configuration could not be built
    #[error("TLS error: {0}")]
    Tls(String),

    /// DNS service discovery failed
    ///
    /// Never escapes `Cluster::connect`: discovery failures fall back to the literal host list.
    #[error("service discovery failed: {0}")]
    Discovery(String),

    /// Management HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error returned by the network engine, passed through unchanged
    #[error(transparent)]
    Engine(BoxError),
}

impl Error {
    /// Whether this error was raised while validating user configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedScheme(_)
                | Error::InvalidConnectionString(_)
                | Error::Config(_)
                | Error::Tls(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
