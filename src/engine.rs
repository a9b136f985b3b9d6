//! Network engine contract
//!
//! The engine that frames the binary protocol, multiplexes requests and owns the
//! sockets lives outside this crate. These traits are the two points where it meets
//! the bootstrap layer: session construction and the SASL exchange used during the
//! handshake.

use crate::connection::SessionConfig;
use crate::BoxError;
use bytes::Bytes;
use futures::future::BoxFuture;
use std::future::Future;
use std::time::Instant;

/// Live connection handle given to an [`AuthHandler`](crate::auth::AuthHandler)
/// while a session is being set up.
pub trait AuthClient: Send {
    /// Run a SASL exchange for `mechanism` with the initial `payload`.
    ///
    /// The exchange must complete before `deadline`. Cancellation and timeouts are the
    /// implementation's responsibility. Returns the server's final response.
    fn exec_sasl_auth<'a>(
        &'a mut self,
        mechanism: &'a [u8],
        payload: &'a [u8],
        deadline: Instant,
    ) -> BoxFuture<'a, Result<Bytes, BoxError>>;
}

/// Constructors for the sessions the engine can run
pub trait Engine: Send + Sync {
    /// Key-value session for an ordinary data bucket
    type Agent: Send;

    /// Change-stream session
    type DcpAgent: Send;

    /// Build a data session from `config`.
    ///
    /// The engine drives `config.auth` during each connection handshake and may keep the
    /// configuration for the lifetime of the session.
    fn create_agent(
        &self,
        config: SessionConfig,
    ) -> impl Future<Output = Result<Self::Agent, BoxError>> + Send;

    /// Build a change-stream session from `config`, registered under `stream_name`.
    fn create_dcp_agent(
        &self,
        config: SessionConfig,
        stream_name: &str,
    ) -> impl Future<Output = Result<Self::DcpAgent, BoxError>> + Send;
}
