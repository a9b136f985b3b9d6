//! DNS SRV service discovery
//!
//! A connection string that names exactly one host, without a port, under the
//! `couchbase` or `couchbases` scheme may be a service name rather than a node. In that
//! case `_couchbase._tcp.<host>` (or `_couchbases._tcp.<host>`) is looked up, and the
//! returned targets replace the host list.
//!
//! Discovery is best effort: lookup failures and empty answers leave the connection
//! spec untouched.

mod hickory;

pub use hickory::HickoryResolver;

use crate::client::{ConnSpec, HostPort, Scheme};
use crate::metrics::labels::{SRV_EMPTY, SRV_FAILED, SRV_RESOLVED};
use crate::protocol::constants::srv;
use crate::Result;
use futures::future::BoxFuture;
use std::net::IpAddr;
use std::time::Instant;

/// Single SRV answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    /// Target host, without trailing dot
    pub target: String,
    /// Service port
    pub port: u16,
    /// Lower is preferred
    pub priority: u16,
    /// Relative weight among records of equal priority
    pub weight: u16,
}

/// Performs SRV lookups
pub trait SrvResolver: Send + Sync {
    /// Look up SRV records for `name`, returned in the order DNS answered
    fn lookup_srv<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<SrvRecord>>>;
}

/// SRV name to query for `spec`, if the spec qualifies for discovery
pub fn srv_query_name(spec: &ConnSpec) -> Option<String> {
    let [host] = spec.hosts.as_slice() else {
        return None;
    };

    if host.explicit_port().is_some() || host.host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let service = match spec.scheme {
        Scheme::Couchbase => srv::COUCHBASE,
        Scheme::Couchbases => srv::COUCHBASES,
        Scheme::Http => return None,
    };

    Some(format!("{}.{}", service, host.host))
}

/// Replace the host list of `spec` with SRV targets, when applicable.
///
/// Returns whether the host list was replaced. Never fails.
pub async fn resolve_srv<R>(spec: &mut ConnSpec, resolver: &R) -> bool
where
    R: SrvResolver + ?Sized,
{
    let Some(name) = srv_query_name(spec) else {
        return false;
    };

    let lookup_start = Instant::now();
    let result = resolver.lookup_srv(&name).await;
    crate::metrics::histograms::srv_lookup_duration(lookup_start.elapsed().as_millis() as u64);

    // A target of "." means the service is not available at this domain
    let result = result.map(|records| {
        records
            .into_iter()
            .filter(|record| !record.target.is_empty())
            .collect::<Vec<_>>()
    });

    let mut records = match result {
        Ok(records) if records.is_empty() => {
            tracing::debug!(%name, "SRV lookup returned no records, using literal host");
            crate::metrics::counters::srv_lookup(SRV_EMPTY);
            return false;
        }
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(%name, "SRV lookup failed, using literal host: {}", e);
            crate::metrics::counters::srv_lookup(SRV_FAILED);
            return false;
        }
    };

    // Stable: records of equal priority keep the order DNS returned them in
    records.sort_by_key(|record| record.priority);

    spec.hosts = records
        .into_iter()
        .map(|record| HostPort::new(record.target, Some(record.port)))
        .collect();

    tracing::debug!(%name, hosts = spec.hosts.len(), "SRV lookup replaced host list");
    crate::metrics::counters::srv_lookup(SRV_RESOLVED);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Mutex;

    /// Answers every lookup with a canned result and records the queried names
    struct StaticResolver {
        answer: std::result::Result<Vec<SrvRecord>, String>,
        queries: Mutex<Vec<String>>,
    }

    impl StaticResolver {
        fn new(answer: std::result::Result<Vec<SrvRecord>, String>) -> Self {
            Self {
                answer,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl SrvResolver for StaticResolver {
        fn lookup_srv<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<SrvRecord>>> {
            self.queries.lock().unwrap().push(name.to_string());
            let answer = self.answer.clone().map_err(Error::Discovery);
            Box::pin(async move { answer })
        }
    }

    fn record(target: &str, port: u16, priority: u16) -> SrvRecord {
        SrvRecord {
            target: target.to_string(),
            port,
            priority,
            weight: 0,
        }
    }

    #[test]
    fn test_query_name_couchbase() {
        let spec = ConnSpec::parse("couchbase://cluster.example.com").unwrap();
        assert_eq!(
            srv_query_name(&spec),
            Some("_couchbase._tcp.cluster.example.com".to_string())
        );
    }

    #[test]
    fn test_query_name_couchbases() {
        let spec = ConnSpec::parse("couchbases://cluster.example.com").unwrap();
        assert_eq!(
            srv_query_name(&spec),
            Some("_couchbases._tcp.cluster.example.com".to_string())
        );
    }

    #[test]
    fn test_query_name_not_applicable() {
        for input in [
            "couchbase://a.example.com,b.example.com",
            "couchbase://cluster.example.com:11210",
            "couchbase://10.0.0.1",
            "couchbase://[::1]",
            "http://cluster.example.com",
            "cluster.example.com",
        ] {
            let spec = ConnSpec::parse(input).unwrap();
            assert_eq!(srv_query_name(&spec), None, "input: {}", input);
        }
    }

    #[test]
    fn test_query_name_zero_port_counts_as_unset() {
        let spec = ConnSpec::parse("couchbase://cluster.example.com:0").unwrap();
        assert!(srv_query_name(&spec).is_some());
    }

    #[tokio::test]
    async fn test_resolve_replaces_hosts_sorted_by_priority() {
        let resolver = StaticResolver::new(Ok(vec![
            record("backup.example.com", 11210, 20),
            record("node1.example.com", 11210, 10),
            record("node2.example.com", 11300, 10),
        ]));
        let mut spec = ConnSpec::parse("couchbase://cluster.example.com").unwrap();

        assert!(resolve_srv(&mut spec, &resolver).await);
        assert_eq!(
            spec.hosts,
            vec![
                HostPort::new("node1.example.com", Some(11210)),
                HostPort::new("node2.example.com", Some(11300)),
                HostPort::new("backup.example.com", Some(11210)),
            ]
        );
        assert_eq!(resolver.queries(), vec!["_couchbase._tcp.cluster.example.com"]);
    }

    #[tokio::test]
    async fn test_resolve_failure_leaves_spec_unchanged() {
        let resolver = StaticResolver::new(Err("NXDOMAIN".to_string()));
        let mut spec = ConnSpec::parse("couchbases://cluster.example.com").unwrap();
        let before = spec.clone();

        assert!(!resolve_srv(&mut spec, &resolver).await);
        assert_eq!(spec, before);
        assert_eq!(resolver.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_empty_answer_leaves_spec_unchanged() {
        let resolver = StaticResolver::new(Ok(Vec::new()));
        let mut spec = ConnSpec::parse("couchbase://cluster.example.com").unwrap();
        let before = spec.clone();

        assert!(!resolve_srv(&mut spec, &resolver).await);
        assert_eq!(spec, before);
    }

    #[tokio::test]
    async fn test_resolve_root_target_leaves_spec_unchanged() {
        let resolver = StaticResolver::new(Ok(vec![record("", 0, 0)]));
        let mut spec = ConnSpec::parse("couchbase://cluster.example.com").unwrap();
        let before = spec.clone();

        assert!(!resolve_srv(&mut spec, &resolver).await);
        assert_eq!(spec, before);
    }

    #[tokio::test]
    async fn test_resolve_drops_root_targets() {
        let resolver = StaticResolver::new(Ok(vec![
            record("", 0, 0),
            record("node1.example.com", 11210, 10),
        ]));
        let mut spec = ConnSpec::parse("couchbase://cluster.example.com").unwrap();

        assert!(resolve_srv(&mut spec, &resolver).await);
        assert_eq!(
            spec.hosts,
            vec![HostPort::new("node1.example.com", Some(11210))]
        );
    }

    #[tokio::test]
    async fn test_resolve_skips_lookup_when_not_applicable() {
        let resolver = StaticResolver::new(Ok(vec![record("x", 1, 0)]));
        let mut spec = ConnSpec::parse("couchbase://a,b").unwrap();
        let before = spec.clone();

        assert!(!resolve_srv(&mut spec, &resolver).await);
        assert_eq!(spec, before);
        assert!(resolver.queries().is_empty());
    }
}
