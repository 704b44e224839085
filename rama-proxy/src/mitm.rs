//! MITM wiring: terminate the TLS side of an intercepted `CONNECT` tunnel
//! against an on-the-fly leaf certificate, handing the decrypted byte stream
//! back to the caller to be parsed as HTTP/1.1 and re-dispatched with the
//! session flagged secure (spec §4.3).
//!
//! Cert minting/caching and the `rustls` wiring itself live in
//! `rama_tls_rustls::mitm`; this module only adapts that acceptor to the
//! [`rama_http::io::upgrade::Upgraded`] client stream the tunnel engine
//! already hands off for plain (non-MITM) tunneling.

use std::fmt;
use std::time::Duration;

use rama_crypto::ca::CaMaterial;
use rama_http::io::upgrade::Upgraded;
use rama_tls_rustls::mitm::{MitmError as TlsMitmError, build_acceptor};
use rama_tls_rustls::tokio_rustls::TlsAcceptor;
use rama_tls_rustls::tokio_rustls::server::TlsStream;

/// Failure terminating the MITM'd TLS side of a `CONNECT` tunnel.
#[derive(Debug)]
pub enum MitmError {
    /// Building the acceptor (cert load, provider setup) failed.
    Setup(TlsMitmError),
    /// The TLS handshake with the client failed — including an h2-only
    /// client's ALPN offer being rejected, since HTTP/2 is not MITM'd
    /// (spec §4.3: "if the client ALPN negotiates h2, the CONNECT falls
    /// back to raw tunneling"). A failed handshake has already consumed
    /// the client's `ClientHello` bytes, so recovering a byte-identical
    /// raw tunnel at this point isn't possible; the caller should close
    /// the connection rather than retry as a plain tunnel.
    Handshake(std::io::Error),
}

impl fmt::Display for MitmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(e) => write!(f, "failed to set up the MITM TLS acceptor: {e}"),
            Self::Handshake(e) => write!(f, "MITM TLS handshake with the client failed: {e}"),
        }
    }
}

impl std::error::Error for MitmError {}

/// Builds MITM TLS acceptors for one configured CA.
///
/// Cheap to hold long-lived: the expensive part (leaf minting) is cached
/// per-SNI inside the `rustls` acceptor itself, not re-derived here.
pub struct MitmEngine {
    acceptor: TlsAcceptor,
}

impl MitmEngine {
    pub fn new(ca: CaMaterial, organization: impl Into<String>, validity: Duration) -> Result<Self, MitmError> {
        let acceptor = build_acceptor(ca, organization, validity).map_err(MitmError::Setup)?;
        Ok(Self { acceptor })
    }

    /// Re-terminate TLS on the already-hijacked `client` stream, minting (or
    /// reusing) a leaf certificate for whichever SNI name the client offers.
    pub async fn terminate(&self, client: Upgraded) -> Result<TlsStream<Upgraded>, MitmError> {
        self.acceptor.accept(client).await.map_err(MitmError::Handshake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ca() -> CaMaterial {
        CaMaterial::generate_self_signed("rama-proxy-mitm-test").unwrap()
    }

    #[test]
    fn engine_builds_from_ca_material() {
        MitmEngine::new(test_ca(), "test", Duration::from_secs(3600)).unwrap();
    }
}
