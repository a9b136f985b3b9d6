//! Cluster handle, connection strings and session handles

mod cluster;
mod connection_string;
mod options;
mod session;

pub use cluster::Cluster;
pub use connection_string::{ConnSpec, HostPort, Scheme};
pub use options::{ClusterOptions, ClusterOptionsBuilder};
pub use session::{Bucket, ClusterManager, StreamingBucket};
