//! Couchbase protocol constants

use std::time::Duration;

/// Default ports per protocol surface
pub mod ports {
    /// Key-value binary protocol
    pub const KV: u16 = 11210;

    /// Key-value binary protocol over TLS
    pub const KV_TLS: u16 = 11207;

    /// HTTP management interface
    pub const MGMT: u16 = 8091;

    /// HTTP management interface over TLS
    pub const MGMT_TLS: u16 = 18091;
}

/// Connection string scheme tokens
pub mod schemes {
    /// Legacy HTTP bootstrap
    pub const HTTP: &str = "http";

    /// Unencrypted key-value bootstrap
    pub const COUCHBASE: &str = "couchbase";

    /// Encrypted key-value bootstrap
    pub const COUCHBASES: &str = "couchbases";
}

/// DNS SRV service prefixes
pub mod srv {
    /// Service record for unencrypted key-value nodes
    pub const COUCHBASE: &str = "_couchbase._tcp";

    /// Service record for encrypted key-value nodes
    pub const COUCHBASES: &str = "_couchbases._tcp";
}

/// SASL mechanism names
pub mod sasl {
    /// PLAIN (RFC 4616)
    pub const PLAIN: &[u8] = b"PLAIN";
}

/// Connection string option keys
pub mod options {
    /// Overall connect timeout, milliseconds
    pub const CONNECT_TIMEOUT: &str = "connect_timeout";

    /// Per-server connect timeout, milliseconds
    pub const SERVER_CONNECT_TIMEOUT: &str = "server_connect_timeout";

    /// Certificate verification policy (`none` or `peer`)
    pub const TLS_VERIFY: &str = "tls_verify";

    /// PEM file with trusted CA certificates
    pub const CERT_PATH: &str = "certpath";
}

/// Host used when the connection string lists none
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default overall connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Default per-server connect timeout
pub const DEFAULT_SERVER_CONNECT_TIMEOUT: Duration = Duration::from_millis(7_000);
