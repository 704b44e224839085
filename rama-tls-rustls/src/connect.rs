//! Client-side TLS connector, used to dial an `HTTPS` proxy entry (a
//! forward proxy reached over TLS, as opposed to a plain-TCP `PROXY` entry).
//!
//! Grounded on the teacher's own CLI TLS client config builder
//! (`rama-cli/src/cmd/http/tls.rs`'s `create_tls_client_config`): a
//! `webpki-roots`-trusted `RootCertStore`, no client auth, same
//! `ring`/`aws-lc` crypto-provider feature gating `mitm.rs` already uses.

use std::fmt;
use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::{TlsConnector, client::TlsStream};

/// Failure building the client TLS connector or completing a handshake.
#[derive(Debug)]
pub enum ConnectError {
    /// `rustls` rejected the client config.
    Tls(String),
    /// `server_name` is not a valid DNS name or IP address.
    InvalidServerName(String),
    /// The TLS handshake itself failed.
    Handshake(std::io::Error),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls(msg) => write!(f, "failed to build TLS client config: {msg}"),
            Self::InvalidServerName(name) => write!(f, "invalid TLS server name `{name}`"),
            Self::Handshake(e) => write!(f, "TLS handshake failed: {e}"),
        }
    }
}

impl std::error::Error for ConnectError {}

#[cfg(all(feature = "ring", not(feature = "aws-lc")))]
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

#[cfg(feature = "aws-lc")]
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::aws_lc_rs::default_provider())
}

/// Build a [`TlsConnector`] trusting the `webpki-roots` bundled CA set, with
/// no client certificate authentication.
pub fn build_connector() -> Result<TlsConnector, ConnectError> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| ConnectError::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Complete a client TLS handshake over `stream`, authenticating the peer as
/// `server_name` (the SNI name sent and the name checked against the peer's
/// certificate).
pub async fn connect<S>(connector: &TlsConnector, server_name: &str, stream: S) -> Result<TlsStream<S>, ConnectError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let name = ServerName::try_from(server_name.to_owned()).map_err(|_| ConnectError::InvalidServerName(server_name.to_owned()))?;
    connector.connect(name, stream).await.map_err(ConnectError::Handshake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_connector_without_error() {
        build_connector().unwrap();
    }

    #[tokio::test]
    async fn connect_rejects_invalid_server_name() {
        let connector = build_connector().unwrap();
        let (client, _server) = tokio::io::duplex(64);
        let err = connect(&connector, "not a valid name!", client).await.unwrap_err();
        assert!(matches!(err, ConnectError::InvalidServerName(_)));
    }
}
