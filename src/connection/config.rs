//! Session configuration handed to the network engine

use super::endpoints::{management_url, ResolvedEndpoints};
use super::tls::TlsConfig;
use crate::auth::AuthHandler;
use crate::protocol::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SERVER_CONNECT_TIMEOUT};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Everything the network engine needs to open a session
///
/// Built fresh for every session by [`Cluster`](crate::Cluster) and moved into the engine
/// constructor, which may keep it for the lifetime of the session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Key-value endpoints in failover order
    pub kv_endpoints: Vec<String>,
    /// Management endpoints, index-aligned with `kv_endpoints`
    pub mgmt_endpoints: Vec<String>,
    /// TLS configuration; `None` means plaintext
    pub tls: Option<TlsConfig>,
    /// Bucket the session is bound to
    pub bucket_name: String,
    /// Handshake authentication
    pub auth: Arc<dyn AuthHandler>,
    /// Overall time allowed to bring the session up
    pub connect_timeout: Duration,
    /// Time allowed for each individual server connection
    pub server_connect_timeout: Duration,
}

impl SessionConfig {
    /// Create a builder for a session on `bucket_name`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = SessionConfig::builder("travel-sample", endpoints, auth)
    ///     .tls(tls)
    ///     .connect_timeout(Duration::from_secs(30))
    ///     .build()?;
    /// ```
    pub fn builder(
        bucket_name: impl Into<String>,
        endpoints: ResolvedEndpoints,
        auth: Arc<dyn AuthHandler>,
    ) -> SessionConfigBuilder {
        SessionConfigBuilder {
            bucket_name: bucket_name.into(),
            endpoints,
            auth,
            tls: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            server_connect_timeout: DEFAULT_SERVER_CONNECT_TIMEOUT,
        }
    }

    /// Whether the session uses TLS
    pub fn is_encrypted(&self) -> bool {
        self.tls.is_some()
    }

    /// Management base URLs, `https://` when the session is encrypted
    pub fn management_urls(&self) -> Vec<String> {
        let encrypted = self.is_encrypted();
        self.mgmt_endpoints
            .iter()
            .map(|endpoint| management_url(endpoint, encrypted))
            .collect()
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("kv_endpoints", &self.kv_endpoints)
            .field("mgmt_endpoints", &self.mgmt_endpoints)
            .field("tls", &self.tls)
            .field("bucket_name", &self.bucket_name)
            .field("auth", &"<AuthHandler>")
            .field("connect_timeout", &self.connect_timeout)
            .field("server_connect_timeout", &self.server_connect_timeout)
            .finish()
    }
}

/// Builder for [`SessionConfig`]
pub struct SessionConfigBuilder {
    bucket_name: String,
    endpoints: ResolvedEndpoints,
    auth: Arc<dyn AuthHandler>,
    tls: Option<TlsConfig>,
    connect_timeout: Duration,
    server_connect_timeout: Duration,
}

impl SessionConfigBuilder {
    /// Set the transport security; must be `Some` exactly when the endpoints are encrypted
    pub fn tls(mut self, tls: Option<TlsConfig>) -> Self {
        self.tls = tls;
        self
    }

    /// Set the overall connect timeout
    ///
    /// Default: 60 seconds
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Set the per-server connect timeout
    ///
    /// Default: 7 seconds
    pub fn server_connect_timeout(mut self, duration: Duration) -> Self {
        self.server_connect_timeout = duration;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the endpoint list is empty or the TLS setting
    /// disagrees with the endpoints' encryption flag.
    pub fn build(self) -> Result<SessionConfig> {
        if self.endpoints.kv_endpoints.is_empty() {
            return Err(Error::Config("session requires at least one endpoint".into()));
        }

        if self.endpoints.encrypted != self.tls.is_some() {
            return Err(Error::Config(format!(
                "endpoints are {} but TLS configuration is {}",
                if self.endpoints.encrypted {
                    "encrypted"
                } else {
                    "plaintext"
                },
                if self.tls.is_some() {
                    "present"
                } else {
                    "absent"
                },
            )));
        }

        Ok(SessionConfig {
            kv_endpoints: self.endpoints.kv_endpoints,
            mgmt_endpoints: self.endpoints.mgmt_endpoints,
            tls: self.tls,
            bucket_name: self.bucket_name,
            auth: self.auth,
            connect_timeout: self.connect_timeout,
            server_connect_timeout: self.server_connect_timeout,
        })
    }
}
