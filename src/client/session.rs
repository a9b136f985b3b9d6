//! Session handles returned by [`Cluster`](super::Cluster)

use crate::auth::Credentials;
use crate::connection::TlsConfig;
use crate::Result;
use std::fmt;
use std::time::Duration;

/// Open data bucket backed by an engine agent
#[derive(Debug)]
pub struct Bucket<A> {
    name: String,
    agent: A,
}

impl<A> Bucket<A> {
    pub(crate) fn new(name: impl Into<String>, agent: A) -> Self {
        Self {
            name: name.into(),
            agent,
        }
    }

    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine agent serving this bucket
    pub fn io_router(&self) -> &A {
        &self.agent
    }

    /// Consume the handle, returning the engine agent
    pub fn into_io_router(self) -> A {
        self.agent
    }
}

/// Open change-stream session on a bucket
#[derive(Debug)]
pub struct StreamingBucket<A> {
    name: String,
    stream_name: String,
    agent: A,
}

impl<A> StreamingBucket<A> {
    pub(crate) fn new(name: impl Into<String>, stream_name: impl Into<String>, agent: A) -> Self {
        Self {
            name: name.into(),
            stream_name: stream_name.into(),
            agent,
        }
    }

    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the stream was registered under
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Engine agent serving this stream
    pub fn io_router(&self) -> &A {
        &self.agent
    }

    /// Consume the handle, returning the engine agent
    pub fn into_io_router(self) -> A {
        self.agent
    }
}

/// Administrative handle for the cluster's management interface
///
/// Carries the management base URLs, the administrator identity and an HTTP client
/// configured with the cluster's transport security. Issuing requests is up to the
/// caller.
#[derive(Clone)]
pub struct ClusterManager {
    hosts: Vec<String>,
    credentials: Credentials,
    http: reqwest::Client,
}

impl ClusterManager {
    pub(crate) fn new(
        hosts: Vec<String>,
        credentials: Credentials,
        tls: Option<&TlsConfig>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(connect_timeout);
        if let Some(tls) = tls {
            builder = builder.use_preconfigured_tls((*tls.client_config()).clone());
        }
        let http = builder.build()?;

        Ok(Self {
            hosts,
            credentials,
            http,
        })
    }

    /// Management base URLs (`http://host:port` or `https://host:port`), in failover order
    pub fn base_urls(&self) -> &[String] {
        &self.hosts
    }

    /// Administrator user name
    pub fn username(&self) -> &str {
        self.credentials.principal()
    }

    /// Administrator password
    pub fn password(&self) -> &str {
        self.credentials.secret()
    }

    /// HTTP client carrying the cluster's transport security
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }
}

impl fmt::Debug for ClusterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterManager")
            .field("hosts", &self.hosts)
            .field("credentials", &self.credentials)
            .finish()
    }
}
