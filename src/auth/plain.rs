//! SASL PLAIN authentication
//!
//! Implements the client side of the PLAIN mechanism (RFC 4616): a single message
//! `authzid NUL authcid NUL passwd`, sent with an empty authorization identity.

use super::AuthHandler;
use crate::engine::AuthClient;
use crate::metrics::labels::MECHANISM_PLAIN;
use crate::protocol::constants::sasl;
use crate::BoxError;
use bytes::{BufMut, Bytes, BytesMut};
use futures::future::BoxFuture;
use std::fmt;
use std::time::Instant;

/// Principal and secret used for a single session
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    principal: String,
    secret: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            secret: secret.into(),
        }
    }

    /// Principal (bucket or user name)
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Secret (password)
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Build the PLAIN initial response: `\0<principal>\0<secret>`
pub fn plain_payload(principal: &str, secret: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(2 + principal.len() + secret.len());

    // Empty authorization identity
    buf.put_u8(0);
    buf.put(principal.as_bytes());
    buf.put_u8(0);
    buf.put(secret.as_bytes());

    buf.freeze()
}

/// [`AuthHandler`] that authenticates with SASL PLAIN
#[derive(Debug, Clone)]
pub struct PlainAuthHandler {
    credentials: Credentials,
}

impl PlainAuthHandler {
    /// Create a handler bound to `credentials`
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Principal this handler authenticates as
    pub fn principal(&self) -> &str {
        self.credentials.principal()
    }
}

impl AuthHandler for PlainAuthHandler {
    fn authenticate<'a>(
        &'a self,
        client: &'a mut dyn AuthClient,
        deadline: Instant,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let payload = plain_payload(self.credentials.principal(), self.credentials.secret());

            tracing::debug!(
                principal = %self.credentials.principal(),
                "initiating SASL PLAIN authentication"
            );
            crate::metrics::counters::auth_attempted(MECHANISM_PLAIN);

            match client.exec_sasl_auth(sasl::PLAIN, &payload, deadline).await {
                Ok(_) => {
                    tracing::debug!("SASL PLAIN authentication successful");
                    Ok(())
                }
                Err(e) => {
                    tracing::debug!("SASL PLAIN authentication failed: {}", e);
                    crate::metrics::counters::auth_failed(MECHANISM_PLAIN);
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    /// Records every exchange and answers with a canned result
    struct RecordingClient {
        calls: Vec<(Vec<u8>, Vec<u8>, Instant)>,
        fail_with: Option<io::ErrorKind>,
    }

    impl RecordingClient {
        fn new(fail_with: Option<io::ErrorKind>) -> Self {
            Self {
                calls: Vec::new(),
                fail_with,
            }
        }
    }

    impl AuthClient for RecordingClient {
        fn exec_sasl_auth<'a>(
            &'a mut self,
            mechanism: &'a [u8],
            payload: &'a [u8],
            deadline: Instant,
        ) -> BoxFuture<'a, Result<Bytes, BoxError>> {
            Box::pin(async move {
                self.calls
                    .push((mechanism.to_vec(), payload.to_vec(), deadline));
                match self.fail_with {
                    Some(kind) => Err(Box::new(io::Error::new(kind, "auth rejected")) as BoxError),
                    None => Ok(Bytes::new()),
                }
            })
        }
    }

    #[test]
    fn test_plain_payload_layout() {
        let payload = plain_payload("bucket", "secret");
        assert_eq!(&payload[..], b"\0bucket\0secret");
    }

    #[test]
    fn test_plain_payload_decodes_to_fields() {
        let payload = plain_payload("Administrator", "p@ss word");
        let fields: Vec<&[u8]> = payload.split(|&b| b == 0).collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], b"");
        assert_eq!(fields[1], b"Administrator");
        assert_eq!(fields[2], b"p@ss word");
    }

    #[test]
    fn test_plain_payload_empty_credentials() {
        let payload = plain_payload("", "");
        assert_eq!(&payload[..], b"\0\0");
    }

    #[test]
    fn test_plain_payload_utf8() {
        let payload = plain_payload("usér", "pässword");
        let fields: Vec<&[u8]> = payload.split(|&b| b == 0).collect();
        assert_eq!(fields[1], "usér".as_bytes());
        assert_eq!(fields[2], "pässword".as_bytes());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("default", "hunter2");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("default"));
        assert!(!debug_str.contains("hunter2"));

        let handler = PlainAuthHandler::new(creds);
        assert!(!format!("{:?}", handler).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_handler_sends_plain_exchange() {
        let handler = PlainAuthHandler::new(Credentials::new("travel-sample", "pw"));
        let mut client = RecordingClient::new(None);
        let deadline = Instant::now() + Duration::from_secs(5);

        handler
            .authenticate(&mut client, deadline)
            .await
            .expect("authentication succeeds");

        assert_eq!(client.calls.len(), 1);
        let (mechanism, payload, seen_deadline) = &client.calls[0];
        assert_eq!(mechanism.as_slice(), b"PLAIN");
        assert_eq!(payload.as_slice(), b"\0travel-sample\0pw");
        assert_eq!(*seen_deadline, deadline);
    }

    #[tokio::test]
    async fn test_handler_returns_exchange_error_unchanged() {
        let handler = PlainAuthHandler::new(Credentials::new("default", "wrong"));
        let mut client = RecordingClient::new(Some(io::ErrorKind::PermissionDenied));

        let err = handler
            .authenticate(&mut client, Instant::now() + Duration::from_secs(1))
            .await
            .unwrap_err();

        let io_err = err
            .downcast_ref::<io::Error>()
            .expect("error keeps its original type");
        assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
        // No retry
        assert_eq!(client.calls.len(), 1);
    }

    #[test]
    fn test_handler_is_reusable_across_handshakes() {
        let handler = PlainAuthHandler::new(Credentials::new("default", "pw"));
        let deadline = Instant::now() + Duration::from_secs(1);

        for _ in 0..3 {
            let mut client = RecordingClient::new(None);
            tokio_test::block_on(handler.authenticate(&mut client, deadline)).unwrap();
            assert_eq!(client.calls.len(), 1);
        }
    }
}
