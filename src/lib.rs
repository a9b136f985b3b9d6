//! Connection bootstrap for Couchbase clients
//!
//! This crate turns a connection string into a fully resolved session configuration
//! that a lower-level network engine consumes. It does not speak the wire protocol.
//!
//! Pipeline:
//! * parse the connection string into a [`ConnSpec`]
//! * optionally expand a single bare host through a DNS SRV lookup
//! * derive key-value and management endpoints, applying per-scheme default ports
//! * select the transport security policy
//! * bind credentials into a SASL PLAIN handshake handler
//! * hand the resulting [`SessionConfig`] to the engine for one of three session kinds
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> couchbase_bootstrap::Result<()> {
//! use couchbase_bootstrap::Cluster;
//!
//! let cluster = Cluster::connect("couchbases://db1.example.com,db2.example.com").await?;
//! let manager = cluster.manager("Administrator", "password")?;
//! for url in manager.base_urls() {
//!     println!("management endpoint: {}", url);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod connection;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod protocol;

pub use client::{
    Bucket, Cluster, ClusterManager, ClusterOptions, ClusterOptionsBuilder, ConnSpec, HostPort,
    Scheme, StreamingBucket,
};
pub use connection::{CertVerification, ResolvedEndpoints, SessionConfig, TlsConfig};
pub use engine::{AuthClient, Engine};
pub use error::{BoxError, Error, Result};
