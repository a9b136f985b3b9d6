//! Authentication
//!
//! The network engine calls an [`AuthHandler`] once per connection handshake. The
//! handler owns the credentials it was created with, so nothing else has to keep the
//! secret around.

mod plain;

pub use plain::{plain_payload, Credentials, PlainAuthHandler};

use crate::engine::AuthClient;
use crate::BoxError;
use futures::future::BoxFuture;
use std::time::Instant;

/// Performs the authentication step of a session handshake
pub trait AuthHandler: Send + Sync {
    /// Authenticate over `client`, finishing before `deadline`.
    ///
    /// Errors from the underlying exchange are returned unchanged.
    fn authenticate<'a>(
        &'a self,
        client: &'a mut dyn AuthClient,
        deadline: Instant,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}
