//! Session configuration
//!
//! This module handles:
//! * Endpoint resolution (key-value and management ports per scheme)
//! * Transport security selection
//! * Assembly of the configuration consumed by the network engine

mod config;
mod endpoints;
mod tls;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use endpoints::{management_url, resolve_endpoints, ResolvedEndpoints};
pub use tls::{select_transport_security, CertVerification, TlsConfig, TlsConfigBuilder};
