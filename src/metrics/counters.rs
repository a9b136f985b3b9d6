//! Counter metrics

use super::labels::SESSION_KIND;
use metrics::counter;

/// A cluster handle was created
pub fn cluster_connected(scheme: &str) {
    counter!("couchbase_bootstrap_clusters_connected_total", "scheme" => scheme.to_string())
        .increment(1);
}

/// An SRV lookup finished with `outcome` (see `labels::SRV_*`)
pub fn srv_lookup(outcome: &'static str) {
    counter!("couchbase_bootstrap_srv_lookups_total", "outcome" => outcome).increment(1);
}

/// A session of `kind` was handed out
pub fn session_opened(kind: &'static str) {
    counter!("couchbase_bootstrap_sessions_opened_total", SESSION_KIND => kind).increment(1);
}

/// Building a session of `kind` failed
pub fn session_open_failed(kind: &'static str) {
    counter!("couchbase_bootstrap_sessions_failed_total", SESSION_KIND => kind).increment(1);
}

/// An authentication exchange was started
pub fn auth_attempted(mechanism: &'static str) {
    counter!("couchbase_bootstrap_auth_attempts_total", "mechanism" => mechanism).increment(1);
}

/// An authentication exchange was rejected or failed
pub fn auth_failed(mechanism: &'static str) {
    counter!("couchbase_bootstrap_auth_failures_total", "mechanism" => mechanism).increment(1);
}
