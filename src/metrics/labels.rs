//! Metric names and label values

/// Session kind label key
pub const SESSION_KIND: &str = "kind";

/// Data bucket session
pub const SESSION_BUCKET: &str = "bucket";

/// Management handle
pub const SESSION_MANAGER: &str = "manager";

/// Streaming (change feed) session
pub const SESSION_STREAMING: &str = "streaming";

/// SASL PLAIN mechanism
pub const MECHANISM_PLAIN: &str = "PLAIN";

/// SRV lookup replaced the host list
pub const SRV_RESOLVED: &str = "resolved";

/// SRV lookup returned no records
pub const SRV_EMPTY: &str = "empty";

/// SRV lookup failed
pub const SRV_FAILED: &str = "failed";
