//! Endpoint resolution
//!
//! A single user-supplied port is ambiguous: under the legacy `http` scheme it names the
//! management port, under `couchbase`/`couchbases` it names the key-value port. The
//! surface it does not name always gets the protocol default.

use crate::client::ConnSpec;
use crate::protocol::constants::ports;

/// Key-value and management endpoints derived from a [`ConnSpec`]
///
/// Both lists have one entry per host and keep the host order of the connection string,
/// so index `i` of each list refers to the same node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    /// `host:port` of each node's key-value service
    pub kv_endpoints: Vec<String>,
    /// `host:port` of each node's management service
    pub mgmt_endpoints: Vec<String>,
    /// Whether these endpoints must be reached over TLS
    pub encrypted: bool,
}

impl ResolvedEndpoints {
    /// Fully qualified management base URLs (`http://` or `https://`)
    pub fn management_urls(&self) -> Vec<String> {
        self.mgmt_endpoints
            .iter()
            .map(|endpoint| management_url(endpoint, self.encrypted))
            .collect()
    }
}

/// Base URL for a management endpoint
pub fn management_url(endpoint: &str, encrypted: bool) -> String {
    if encrypted {
        format!("https://{}", endpoint)
    } else {
        format!("http://{}", endpoint)
    }
}

/// Resolve the endpoints for every host in `spec`
pub fn resolve_endpoints(spec: &ConnSpec) -> ResolvedEndpoints {
    let encrypted = spec.scheme.is_encrypted();
    let legacy_http = spec.scheme.is_legacy_http();

    let (default_kv, default_mgmt) = if encrypted {
        (ports::KV_TLS, ports::MGMT_TLS)
    } else {
        (ports::KV, ports::MGMT)
    };

    let mut kv_endpoints = Vec::with_capacity(spec.hosts.len());
    let mut mgmt_endpoints = Vec::with_capacity(spec.hosts.len());

    for host in &spec.hosts {
        let explicit = host.explicit_port();

        let kv_port = match explicit {
            Some(port) if !legacy_http => port,
            _ => default_kv,
        };
        let mgmt_port = match explicit {
            Some(port) if legacy_http => port,
            _ => default_mgmt,
        };

        kv_endpoints.push(host.endpoint(kv_port));
        mgmt_endpoints.push(host.endpoint(mgmt_port));
    }

    tracing::debug!(
        scheme = %spec.scheme,
        kv = ?kv_endpoints,
        mgmt = ?mgmt_endpoints,
        "resolved endpoints"
    );

    ResolvedEndpoints {
        kv_endpoints,
        mgmt_endpoints,
        encrypted,
    }
}
