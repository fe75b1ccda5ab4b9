//! TLS handshake that captures the peer certificate instead of validating it
//! against a CA. Trust is decided by the `known_hosts` store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::sync::CancellationToken;

use crate::application::ports::IdentityProbe;
use crate::domain::known_hosts::DEFAULT_ALGORITHM;
use crate::domain::{Endpoint, Fingerprint, PendingIdentity};

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts any certificate chain; handshake signatures are still checked so
/// the peer must hold the key for the certificate it presents.
#[derive(Debug)]
struct DeferredTrustVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for DeferredTrustVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Production `IdentityProbe`: SHA-256 of the peer's leaf certificate.
pub struct TlsIdentityProbe {
    connector: TlsConnector,
    timeout: Duration,
    cancel: CancellationToken,
}

impl TlsIdentityProbe {
    /// # Errors
    ///
    /// Returns an error if the TLS client configuration cannot be built.
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let verifier = DeferredTrustVerifier {
            algorithms: provider.signature_verification_algorithms,
        };
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .context("configuring TLS protocol versions")?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
            cancel,
        })
    }

    async fn handshake(&self, endpoint: &Endpoint) -> Result<PendingIdentity> {
        let tcp = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .with_context(|| format!("connecting to {endpoint}"))?;
        let server_name = ServerName::try_from(endpoint.host.clone())
            .with_context(|| format!("invalid server name {:?}", endpoint.host))?;
        let mut tls = self
            .connector
            .connect(server_name, tcp)
            .await
            .with_context(|| format!("TLS handshake with {endpoint}"))?;

        let leaf = tls
            .get_ref()
            .1
            .peer_certificates()
            .and_then(<[CertificateDer<'static>]>::first)
            .ok_or_else(|| anyhow::anyhow!("{endpoint} presented no certificate"))?;
        let digest = Sha256::digest(leaf.as_ref());
        let _ = tls.shutdown().await;

        Ok(PendingIdentity::new(
            endpoint.host_name(),
            DEFAULT_ALGORITHM,
            Fingerprint::new(digest.to_vec()),
        ))
    }
}

impl IdentityProbe for TlsIdentityProbe {
    async fn fetch_identity(&self, endpoint: &Endpoint) -> Result<PendingIdentity> {
        tokio::select! {
            result = self.handshake(endpoint) => result,
            () = tokio::time::sleep(self.timeout) => {
                anyhow::bail!("TLS handshake with {endpoint} timed out after {}s", self.timeout.as_secs())
            }
            () = self.cancel.cancelled() => anyhow::bail!("connection to {endpoint} cancelled"),
        }
    }
}
