//! On-the-fly leaf certificate minting for MITM'd `CONNECT` tunnels.
//!
//! A single [`MitmCertCache`] backs a `rustls` [`ResolvesServerCert`], keyed
//! by SNI, with entries minted on first use via [`rama_crypto::ca::CaMaterial`]
//! and reused until `validity`'s half-life elapses (matching the leaf's own
//! `not_before`/`not_after` window, set symmetrically around the mint time).
//!
//! Grounded on `SPEC_FULL.md` §5's "MITM cert cache (single mutex, keyed by
//! SNI)" shared-state note; the cache itself mirrors the teacher's
//! mutex-guarded-`HashMap` pattern used elsewhere for small, setup-confined
//! shared state.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use rama_crypto::ca::{CaError, CaMaterial};
use rustls::ServerConfig;
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use rustls_pki_types::PrivateKeyDer;
use tokio_rustls::TlsAcceptor;

/// Failure building the MITM TLS acceptor or minting a leaf certificate.
#[derive(Debug)]
pub enum MitmError {
    /// Leaf minting failed (bad hostname, clock, or CA material).
    Ca(CaError),
    /// `rustls` rejected the resolved signing key or server config.
    Tls(String),
}

impl fmt::Display for MitmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ca(e) => write!(f, "CA error while minting MITM leaf: {e}"),
            Self::Tls(msg) => write!(f, "rustls rejected the MITM leaf: {msg}"),
        }
    }
}

impl std::error::Error for MitmError {}

impl From<CaError> for MitmError {
    fn from(e: CaError) -> Self {
        Self::Ca(e)
    }
}

#[cfg(all(feature = "ring", not(feature = "aws-lc")))]
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

#[cfg(feature = "aws-lc")]
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::aws_lc_rs::default_provider())
}

struct CacheEntry {
    certified_key: Arc<CertifiedKey>,
    minted_at: SystemTime,
}

/// Mints and caches per-SNI leaf certificates signed by one CA.
pub struct MitmCertCache {
    ca: CaMaterial,
    organization: String,
    validity: Duration,
    provider: Arc<rustls::crypto::CryptoProvider>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl fmt::Debug for MitmCertCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MitmCertCache")
            .field("organization", &self.organization)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl MitmCertCache {
    pub fn new(ca: CaMaterial, organization: impl Into<String>, validity: Duration) -> Self {
        Self {
            ca,
            organization: organization.into(),
            validity,
            provider: crypto_provider(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn mint(&self, hostname: &str) -> Result<Arc<CertifiedKey>, MitmError> {
        let leaf = self.ca.mint_leaf(hostname, &self.organization, self.validity)?;
        let signing_key = self
            .provider
            .key_provider
            .load_private_key(PrivateKeyDer::Pkcs8(leaf.key_der))
            .map_err(|e| MitmError::Tls(e.to_string()))?;
        Ok(Arc::new(CertifiedKey::new(vec![leaf.cert_der], signing_key)))
    }

    fn certified_key_for(&self, hostname: &str) -> Result<Arc<CertifiedKey>, MitmError> {
        let half_life = self.validity / 2;
        if let Some(entry) = self.entries.lock().unwrap_or_else(|p| p.into_inner()).get(hostname) {
            if entry.minted_at.elapsed().unwrap_or(Duration::MAX) < half_life {
                return Ok(entry.certified_key.clone());
            }
        }

        let certified_key = self.mint(hostname)?;
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).insert(
            hostname.to_owned(),
            CacheEntry {
                certified_key: certified_key.clone(),
                minted_at: SystemTime::now(),
            },
        );
        Ok(certified_key)
    }

    /// Number of distinct hostnames currently cached.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResolvesServerCert for MitmCertCache {
    fn resolve(&self, client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        let hostname = client_hello.server_name()?;
        match self.certified_key_for(hostname) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::warn!(target: "rama::tls::mitm", hostname, error = %err, "failed to mint MITM leaf");
                None
            }
        }
    }
}

/// Build a [`TlsAcceptor`] that mints and serves a fresh leaf certificate for
/// whatever SNI name the client presents, signed by `ca`.
pub fn build_acceptor(
    ca: CaMaterial,
    organization: impl Into<String>,
    validity: Duration,
) -> Result<TlsAcceptor, MitmError> {
    let cache = Arc::new(MitmCertCache::new(ca, organization, validity));
    let provider = cache.provider.clone();
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| MitmError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_cert_resolver(cache);
    // Only HTTP/1.1 is re-terminated: an h2-only client (no "http/1.1" in its
    // ALPN list) fails the handshake per RFC 7301 instead of being silently
    // downgraded to an un-decrypted tunnel.
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(TlsAcceptor::from(Arc::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ca() -> CaMaterial {
        CaMaterial::generate_self_signed("rama-tls-rustls-test").unwrap()
    }

    #[test]
    fn mints_and_caches_leaf_per_hostname() {
        let cache = MitmCertCache::new(test_ca(), "test", Duration::from_secs(3600));
        let first = cache.certified_key_for("a.example").unwrap();
        let second = cache.certified_key_for("a.example").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.certified_key_for("b.example").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn builds_acceptor_without_error() {
        build_acceptor(test_ca(), "test", Duration::from_secs(3600)).unwrap();
    }
}
