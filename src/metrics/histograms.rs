//! Histogram metrics

use super::labels::SESSION_KIND;
use metrics::histogram;

/// Time spent in a single SRV lookup, milliseconds
pub fn srv_lookup_duration(duration_ms: u64) {
    histogram!("couchbase_bootstrap_srv_lookup_duration_ms").record(duration_ms as f64);
}

/// Time from factory call to ready session, milliseconds
pub fn session_open_duration(kind: &'static str, duration_ms: u64) {
    histogram!("couchbase_bootstrap_session_open_duration_ms", SESSION_KIND => kind)
        .record(duration_ms as f64);
}
