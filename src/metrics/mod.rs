//! Metrics for connection bootstrap
//!
//! Recorded through the `metrics` facade; nothing is exported unless the application
//! installs a recorder.
//!
//! * `counters` - connects, SRV lookups, sessions, authentication attempts
//! * `histograms` - SRV lookup and session construction latency
//! * `labels` - label values shared by both

pub mod counters;
pub mod histograms;
pub mod labels;
