//! Cluster handle and session factory

use super::connection_string::ConnSpec;
use super::options::ClusterOptions;
use super::session::{Bucket, ClusterManager, StreamingBucket};
use crate::auth::{Credentials, PlainAuthHandler};
use crate::connection::{
    resolve_endpoints, select_transport_security, CertVerification, ResolvedEndpoints,
    SessionConfig,
};
use crate::discovery::{self, HickoryResolver, SrvResolver};
use crate::engine::Engine;
use crate::metrics::labels::{SESSION_BUCKET, SESSION_MANAGER, SESSION_STREAMING};
use crate::protocol::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SERVER_CONNECT_TIMEOUT};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Handle on a Couchbase cluster
///
/// Holds the resolved connection spec and the session-level settings. Creating
/// sessions only borrows the handle, so one `Cluster` can serve any number of sessions
/// from any number of tasks. Settings change through `&mut self` setters.
#[derive(Debug, Clone)]
pub struct Cluster {
    spec: ConnSpec,
    connect_timeout: Duration,
    server_connect_timeout: Duration,
    cert_verification: CertVerification,
    ca_cert_path: Option<String>,
}

impl Cluster {
    /// Create a cluster handle from a connection string
    ///
    /// A single host without a port under `couchbase://` or `couchbases://` is first
    /// looked up as a DNS SRV service name. If the lookup fails the host is used as is.
    ///
    /// # Errors
    ///
    /// Fails before any network activity if the scheme is unsupported, the connection
    /// string is malformed, or a connection string option has an invalid value.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> couchbase_bootstrap::Result<()> {
    /// use couchbase_bootstrap::Cluster;
    ///
    /// // Explicit node list
    /// let cluster = Cluster::connect("couchbase://10.0.0.1,10.0.0.2:11300").await?;
    ///
    /// // SRV-discovered, encrypted
    /// let cluster = Cluster::connect("couchbases://cluster.example.com").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(connection_string: &str) -> Result<Self> {
        Self::connect_with_options(connection_string, ClusterOptions::default()).await
    }

    /// Create a cluster handle with explicit options
    ///
    /// Options set here take precedence over options in the connection string.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> couchbase_bootstrap::Result<()> {
    /// use couchbase_bootstrap::{CertVerification, Cluster, ClusterOptions};
    /// use std::time::Duration;
    ///
    /// let options = ClusterOptions::builder()
    ///     .connect_timeout(Duration::from_secs(20))
    ///     .cert_verification(CertVerification::Peer)
    ///     .ca_cert_path("/etc/couchbase/ca.pem")
    ///     .build();
    ///
    /// let cluster = Cluster::connect_with_options("couchbases://db.example.com", options).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect_with_options(
        connection_string: &str,
        options: ClusterOptions,
    ) -> Result<Self> {
        Self::connect_with_resolver(connection_string, options, &HickoryResolver::new()).await
    }

    /// Create a cluster handle, using `resolver` for SRV discovery
    pub async fn connect_with_resolver<R>(
        connection_string: &str,
        options: ClusterOptions,
        resolver: &R,
    ) -> Result<Self>
    where
        R: SrvResolver + ?Sized,
    {
        async {
            let mut spec = ConnSpec::parse(connection_string)?;
            let options = options.or(ClusterOptions::from_conn_spec(&spec)?);

            discovery::resolve_srv(&mut spec, resolver).await;

            let cluster = Self::from_spec(spec, options);
            crate::metrics::counters::cluster_connected(cluster.spec.scheme.as_str());
            tracing::info!(
                scheme = %cluster.spec.scheme,
                hosts = cluster.spec.hosts.len(),
                "cluster configured"
            );
            Ok(cluster)
        }
        .instrument(tracing::info_span!("cluster_connect"))
        .await
    }

    /// Create a cluster handle from an already parsed spec, without SRV discovery
    pub fn from_spec(spec: ConnSpec, options: ClusterOptions) -> Self {
        let cluster = Self {
            spec,
            connect_timeout: options.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            server_connect_timeout: options
                .server_connect_timeout
                .unwrap_or(DEFAULT_SERVER_CONNECT_TIMEOUT),
            cert_verification: options.cert_verification.unwrap_or_default(),
            ca_cert_path: options.ca_cert_path,
        };

        if cluster.spec.scheme.is_encrypted() && !cluster.cert_verification.verifies_peer() {
            tracing::warn!("TLS certificate verification is disabled for encrypted connections");
        }

        cluster
    }

    /// Connection spec this cluster connects with
    pub fn spec(&self) -> &ConnSpec {
        &self.spec
    }

    /// Overall session connect timeout
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Set the overall session connect timeout for sessions created afterwards
    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Per-server connect timeout
    pub fn server_connect_timeout(&self) -> Duration {
        self.server_connect_timeout
    }

    /// Set the per-server connect timeout for sessions created afterwards
    pub fn set_server_connect_timeout(&mut self, timeout: Duration) {
        self.server_connect_timeout = timeout;
    }

    /// Certificate verification policy for encrypted connections
    pub fn cert_verification(&self) -> CertVerification {
        self.cert_verification
    }

    /// Set the certificate verification policy for sessions created afterwards
    pub fn set_cert_verification(&mut self, verification: CertVerification) {
        self.cert_verification = verification;
    }

    /// Custom CA file used with [`CertVerification::Peer`]
    pub fn ca_cert_path(&self) -> Option<&str> {
        self.ca_cert_path.as_deref()
    }

    /// Set the custom CA file; `None` reverts to system roots
    pub fn set_ca_cert_path(&mut self, path: Option<String>) {
        self.ca_cert_path = path;
    }

    /// Key-value and management endpoints for the current spec
    pub fn endpoints(&self) -> ResolvedEndpoints {
        resolve_endpoints(&self.spec)
    }

    /// Build the configuration for a session authenticated as `principal`
    ///
    /// Pure with respect to the cluster: every call returns a new configuration.
    pub fn session_config(&self, principal: &str, password: &str) -> Result<SessionConfig> {
        let endpoints = self.endpoints();
        let tls = select_transport_security(
            endpoints.encrypted,
            self.cert_verification,
            self.ca_cert_path.as_deref(),
        )?;
        let auth = Arc::new(PlainAuthHandler::new(Credentials::new(principal, password)));

        SessionConfig::builder(principal, endpoints, auth)
            .tls(tls)
            .connect_timeout(self.connect_timeout)
            .server_connect_timeout(self.server_connect_timeout)
            .build()
    }

    /// Open a data bucket through `engine`
    ///
    /// # Errors
    ///
    /// Engine failures, including authentication failures raised during the
    /// handshake, are returned as [`Error::Engine`] without modification.
    pub async fn open_bucket<E>(
        &self,
        engine: &E,
        bucket: &str,
        password: &str,
    ) -> Result<Bucket<E::Agent>>
    where
        E: Engine,
    {
        let started = Instant::now();
        let result = async {
            let config = self.session_config(bucket, password)?;
            let agent = engine.create_agent(config).await.map_err(Error::Engine)?;
            Ok(Bucket::new(bucket, agent))
        }
        .instrument(tracing::info_span!("open_bucket", bucket = %bucket))
        .await;

        record_session(SESSION_BUCKET, started, &result);
        result
    }

    /// Create an administrative handle for the management interface
    pub fn manager(&self, username: &str, password: &str) -> Result<ClusterManager> {
        let started = Instant::now();
        let result = {
            let _span = tracing::info_span!("manager", user = %username).entered();
            self.session_config(username, password).and_then(|config| {
                ClusterManager::new(
                    config.management_urls(),
                    Credentials::new(username, password),
                    config.tls.as_ref(),
                    config.server_connect_timeout,
                )
            })
        };

        record_session(SESSION_MANAGER, started, &result);
        result
    }

    /// Open a change-stream session on `bucket`, registered as `stream_name`
    pub async fn open_streaming_bucket<E>(
        &self,
        engine: &E,
        stream_name: &str,
        bucket: &str,
        password: &str,
    ) -> Result<StreamingBucket<E::DcpAgent>>
    where
        E: Engine,
    {
        let started = Instant::now();
        let result = async {
            let config = self.session_config(bucket, password)?;
            let agent = engine
                .create_dcp_agent(config, stream_name)
                .await
                .map_err(Error::Engine)?;
            Ok(StreamingBucket::new(bucket, stream_name, agent))
        }
        .instrument(tracing::info_span!(
            "open_streaming_bucket",
            bucket = %bucket,
            stream = %stream_name
        ))
        .await;

        record_session(SESSION_STREAMING, started, &result);
        result
    }
}

fn record_session<T>(kind: &'static str, started: Instant, result: &Result<T>) {
    match result {
        Ok(_) => {
            crate::metrics::counters::session_opened(kind);
            crate::metrics::histograms::session_open_duration(
                kind,
                started.elapsed().as_millis() as u64,
            );
            tracing::info!(kind, "session ready");
        }
        Err(e) => {
            crate::metrics::counters::session_open_failed(kind);
            tracing::warn!(kind, "failed to open session: {}", e);
        }
    }
}
