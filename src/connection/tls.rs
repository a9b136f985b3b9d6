//! Transport security policy for encrypted (`couchbases://`) connections.
//!
//! Unencrypted schemes produce no TLS configuration at all. Encrypted schemes produce a
//! rustls `ClientConfig` whose certificate handling follows [`CertVerification`].

use crate::{Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pemfile::Item;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::fs;
use std::sync::Arc;

/// How the server certificate of an encrypted connection is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertVerification {
    /// Encrypt, but accept any server certificate.
    ///
    /// This is the historical behavior of Couchbase bootstrap clients and stays the
    /// default so existing deployments with self-signed certificates keep working.
    #[default]
    Skip,
    /// Verify the certificate chain and hostname against trusted roots
    Peer,
}

impl CertVerification {
    /// Whether the server certificate is verified
    pub fn verifies_peer(&self) -> bool {
        matches!(self, Self::Peer)
    }
}

impl std::fmt::Display for CertVerification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "none"),
            Self::Peer => write!(f, "peer"),
        }
    }
}

impl std::str::FromStr for CertVerification {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::Skip),
            "peer" => Ok(Self::Peer),
            _ => Err(Error::Config(format!(
                "invalid tls_verify '{}': expected none or peer",
                s
            ))),
        }
    }
}

/// TLS configuration handed to the network engine and the management HTTP client.
///
/// # Examples
///
/// ```ignore
/// use couchbase_bootstrap::connection::{CertVerification, TlsConfig};
///
/// // Encrypted, no certificate verification (default)
/// let tls = TlsConfig::builder().build()?;
///
/// // Verified against a private CA
/// let tls = TlsConfig::builder()
///     .cert_verification(CertVerification::Peer)
///     .ca_cert_path("/etc/couchbase/ca.pem")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct TlsConfig {
    /// Certificate verification policy
    verification: CertVerification,
    /// Path to CA certificate file (None = use system roots)
    ca_cert_path: Option<String>,
    /// Compiled rustls ClientConfig
    client_config: Arc<ClientConfig>,
}

impl TlsConfig {
    /// Create a new TLS configuration builder.
    pub fn builder() -> TlsConfigBuilder {
        TlsConfigBuilder::default()
    }

    /// Get the rustls ClientConfig for this TLS configuration.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }

    /// Certificate verification policy in effect
    pub fn cert_verification(&self) -> CertVerification {
        self.verification
    }

    /// Whether any server certificate is accepted.
    pub fn danger_accept_invalid_certs(&self) -> bool {
        !self.verification.verifies_peer()
    }

    /// Custom CA file, if one was configured
    pub fn ca_cert_path(&self) -> Option<&str> {
        self.ca_cert_path.as_deref()
    }
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("verification", &self.verification)
            .field("ca_cert_path", &self.ca_cert_path)
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

/// Builder for TLS configuration.
#[derive(Debug, Default)]
pub struct TlsConfigBuilder {
    verification: CertVerification,
    ca_cert_path: Option<String>,
}

impl TlsConfigBuilder {
    /// Set the certificate verification policy (default: [`CertVerification::Skip`]).
    pub fn cert_verification(mut self, verification: CertVerification) -> Self {
        self.verification = verification;
        self
    }

    /// Set the path to a custom CA certificate file (PEM format).
    ///
    /// Only consulted with [`CertVerification::Peer`]. If not set, system root
    /// certificates are used, falling back to the bundled webpki roots.
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Build the TLS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - CA certificate file cannot be read
    /// - CA certificate file contains no certificates
    pub fn build(self) -> Result<TlsConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(format!("no usable TLS protocol versions: {}", e)))?;

        let client_config = match self.verification {
            CertVerification::Skip => builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier { provider }))
                .with_no_client_auth(),
            CertVerification::Peer => {
                let root_store = match &self.ca_cert_path {
                    Some(ca_path) => load_custom_ca(ca_path)?,
                    None => load_system_roots(),
                };
                builder
                    .with_root_certificates(root_store)
                    .with_no_client_auth()
            }
        };

        Ok(TlsConfig {
            verification: self.verification,
            ca_cert_path: self.ca_cert_path,
            client_config: Arc::new(client_config),
        })
    }
}

/// Select the transport security for a connection.
///
/// Returns `None` for unencrypted connections, signaling plaintext transport.
pub fn select_transport_security(
    encrypted: bool,
    verification: CertVerification,
    ca_cert_path: Option<&str>,
) -> Result<Option<TlsConfig>> {
    if !encrypted {
        return Ok(None);
    }

    let mut builder = TlsConfig::builder().cert_verification(verification);
    if let Some(path) = ca_cert_path {
        builder = builder.ca_cert_path(path);
    }

    Ok(Some(builder.build()?))
}

fn load_system_roots() -> RootCertStore {
    let result = rustls_native_certs::load_native_certs();

    let mut store = RootCertStore::empty();
    let (added, _ignored) = store.add_parsable_certificates(result.certs);

    if added == 0 {
        tracing::debug!(
            errors = result.errors.len(),
            "no native root certificates found, using bundled webpki roots"
        );
        store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    store
}

/// Load a custom CA certificate from a PEM file.
fn load_custom_ca(ca_path: &str) -> Result<RootCertStore> {
    let ca_cert_data = fs::read(ca_path).map_err(|e| {
        Error::Tls(format!(
            "failed to read CA certificate file '{}': {}",
            ca_path, e
        ))
    })?;

    let mut reader = std::io::Cursor::new(&ca_cert_data);
    let mut root_store = RootCertStore::empty();
    let mut found_certs = 0;

    loop {
        match rustls_pemfile::read_one(&mut reader) {
            Ok(Some(Item::X509Certificate(cert))) => {
                let (added, _ignored) =
                    root_store.add_parsable_certificates(std::iter::once(cert));
                found_certs += added;
            }
            Ok(Some(_)) => {
                // Skip non-certificate items (private keys, etc.)
            }
            Ok(None) => break,
            Err(_) => {
                return Err(Error::Tls(format!(
                    "failed to parse CA certificate from '{}'",
                    ca_path
                )));
            }
        }
    }

    if found_certs == 0 {
        return Err(Error::Tls(format!(
            "no valid certificates found in '{}'",
            ca_path
        )));
    }

    Ok(root_store)
}

/// Accepts every server certificate. Signatures are still checked so the handshake
/// proves possession of the presented key.
#[derive(Debug)]
struct NoVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
