//! Cluster-level configuration
//!
//! Options can come from two places: the connection string query
//! (`couchbase://host?connect_timeout=30000`) and [`ClusterOptions::builder`]. Values
//! set through the builder win over the connection string, which wins over defaults.

use super::connection_string::ConnSpec;
use crate::connection::CertVerification;
use crate::protocol::constants::options;
use crate::{Error, Result};
use std::time::Duration;

/// Cluster configuration; unset fields fall back to the connection string or defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Overall session connect timeout (default: 60 seconds)
    pub connect_timeout: Option<Duration>,
    /// Per-server connect timeout (default: 7 seconds)
    pub server_connect_timeout: Option<Duration>,
    /// Certificate verification for encrypted connections (default: skip)
    pub cert_verification: Option<CertVerification>,
    /// PEM file with trusted CA certificates, used with `CertVerification::Peer`
    pub ca_cert_path: Option<String>,
}

impl ClusterOptions {
    /// Create a builder
    ///
    /// # Examples
    ///
    /// ```
    /// use couchbase_bootstrap::ClusterOptions;
    /// use std::time::Duration;
    ///
    /// let options = ClusterOptions::builder()
    ///     .connect_timeout(Duration::from_secs(30))
    ///     .server_connect_timeout(Duration::from_secs(2))
    ///     .build();
    /// assert_eq!(options.connect_timeout, Some(Duration::from_secs(30)));
    /// ```
    pub fn builder() -> ClusterOptionsBuilder {
        ClusterOptionsBuilder::default()
    }

    /// Read options from the query part of a connection string.
    ///
    /// Unknown keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a known key carries a malformed value.
    pub fn from_conn_spec(spec: &ConnSpec) -> Result<Self> {
        let mut parsed = Self::default();

        for (key, value) in &spec.options {
            match key.as_str() {
                options::CONNECT_TIMEOUT => {
                    parsed.connect_timeout = Some(parse_millis(key, value)?);
                }
                options::SERVER_CONNECT_TIMEOUT => {
                    parsed.server_connect_timeout = Some(parse_millis(key, value)?);
                }
                options::TLS_VERIFY => {
                    parsed.cert_verification = Some(value.parse()?);
                }
                options::CERT_PATH => {
                    parsed.ca_cert_path = Some(value.clone());
                }
                _ => {
                    tracing::warn!("ignoring unknown connection string option: {}", key);
                }
            }
        }

        Ok(parsed)
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: ClusterOptions) -> Self {
        Self {
            connect_timeout: self.connect_timeout.or(fallback.connect_timeout),
            server_connect_timeout: self
                .server_connect_timeout
                .or(fallback.server_connect_timeout),
            cert_verification: self.cert_verification.or(fallback.cert_verification),
            ca_cert_path: self.ca_cert_path.or(fallback.ca_cert_path),
        }
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    value.parse::<u64>().map(Duration::from_millis).map_err(|_| {
        Error::Config(format!(
            "invalid {} '{}': expected milliseconds as an unsigned integer",
            key, value
        ))
    })
}

/// Builder for [`ClusterOptions`]
#[derive(Debug, Clone, Default)]
pub struct ClusterOptionsBuilder {
    options: ClusterOptions,
}

impl ClusterOptionsBuilder {
    /// Set the overall session connect timeout
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.options.connect_timeout = Some(duration);
        self
    }

    /// Set the per-server connect timeout
    pub fn server_connect_timeout(mut self, duration: Duration) -> Self {
        self.options.server_connect_timeout = Some(duration);
        self
    }

    /// Set the certificate verification policy for encrypted connections
    pub fn cert_verification(mut self, verification: CertVerification) -> Self {
        self.options.cert_verification = Some(verification);
        self
    }

    /// Set a PEM file with trusted CA certificates
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.options.ca_cert_path = Some(path.into());
        self
    }

    /// Build the options
    pub fn build(self) -> ClusterOptions {
        self.options
    }
}
