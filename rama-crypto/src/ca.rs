//! CA certificate/key loading and on-demand leaf certificate minting, used
//! by the MITM engine (`rama-tls-rustls::mitm`) to terminate intercepted
//! `CONNECT` tunnels under a certificate chaining to a locally trusted CA.

use crate::dep::rcgen;
use rcgen::{CertificateParams, DnType, Issuer, KeyPair, SanType};
use rustls_pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Error loading CA material or minting a leaf certificate.
#[derive(Debug)]
pub enum CaError {
    /// The CA certificate or key PEM could not be parsed.
    InvalidPem(String),
    /// `rcgen` rejected the certificate parameters or signing request.
    Rcgen(rcgen::Error),
    /// The system clock is unusable (before `UNIX_EPOCH`).
    SystemTime,
}

impl fmt::Display for CaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPem(msg) => write!(f, "invalid CA PEM material: {msg}"),
            Self::Rcgen(e) => write!(f, "certificate minting failed: {e}"),
            Self::SystemTime => write!(f, "system clock is before the unix epoch"),
        }
    }
}

impl std::error::Error for CaError {}

impl From<rcgen::Error> for CaError {
    fn from(e: rcgen::Error) -> Self {
        Self::Rcgen(e)
    }
}

/// CA certificate + private key, as loaded from disk or a `data:` URI
/// (loader-resolved PEM bytes), ready to sign leaf certificates with.
pub struct CaMaterial {
    key_pair: KeyPair,
    issuer: Issuer<'static, KeyPair>,
}

impl fmt::Debug for CaMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaMaterial").finish_non_exhaustive()
    }
}

impl CaMaterial {
    /// Parse a CA certificate and private key from PEM text.
    pub fn from_pem(cert_pem: &str, key_pem: &str) -> Result<Self, CaError> {
        let key_pair =
            KeyPair::from_pem(key_pem).map_err(|e| CaError::InvalidPem(e.to_string()))?;
        let ca_params = CertificateParams::from_ca_cert_pem(cert_pem)
            .map_err(|e| CaError::InvalidPem(e.to_string()))?;
        let issuer = Issuer::new(ca_params, key_pair.clone());
        Ok(Self { key_pair, issuer })
    }

    /// Generate a fresh, self-signed CA (used when no CA material is
    /// configured and the operator opted into an ephemeral one at startup).
    pub fn generate_self_signed(organization: &str) -> Result<Self, CaError> {
        let key_pair = KeyPair::generate()?;
        let mut params = CertificateParams::default();
        params
            .distinguished_name
            .push(DnType::OrganizationName, organization);
        params
            .distinguished_name
            .push(DnType::CommonName, format!("{organization} MITM CA"));
        params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        let issuer = Issuer::new(params, key_pair.clone());
        Ok(Self { key_pair, issuer })
    }

    /// Mint a leaf certificate for `hostname`, signed by this CA.
    ///
    /// Subject CN and SAN are both set to `hostname`. Validity spans
    /// `now ± validity/2`, per the MITM engine's minting rules.
    pub fn mint_leaf(
        &self,
        hostname: &str,
        organization: &str,
        validity: Duration,
    ) -> Result<LeafCert, CaError> {
        let half = validity / 2;
        let now = SystemTime::now();
        let not_before = now.checked_sub(half).ok_or(CaError::SystemTime)?;
        let not_after = now.checked_add(half).ok_or(CaError::SystemTime)?;

        let mut params = CertificateParams::new(vec![hostname.to_owned()])?;
        params
            .distinguished_name
            .push(DnType::CommonName, hostname);
        params
            .distinguished_name
            .push(DnType::OrganizationName, organization);
        params.subject_alt_names = vec![san_for(hostname)?];
        params.not_before = not_before.into();
        params.not_after = not_after.into();

        let leaf_key = KeyPair::generate()?;
        let cert = params.signed_by(&leaf_key, &self.issuer)?;

        Ok(LeafCert {
            cert_der: cert.der().clone(),
            key_der: PrivatePkcs8KeyDer::from(leaf_key.serialize_der()),
            minted_at: now,
        })
    }

    /// The CA's own key pair, for callers that need to re-derive an issuer.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }
}

fn san_for(hostname: &str) -> Result<SanType, CaError> {
    if let Ok(ip) = hostname.parse::<std::net::IpAddr>() {
        Ok(SanType::IpAddress(ip))
    } else {
        let dns_name = hostname
            .try_into()
            .map_err(|e| CaError::InvalidPem(format!("`{hostname}` is not a valid DNS name for a SAN: {e}")))?;
        Ok(SanType::DnsName(dns_name))
    }
}

/// A minted leaf certificate and its private key, ready to be loaded into a
/// `rustls::ServerConfig` for a single MITM'd TLS connection.
pub struct LeafCert {
    /// The DER-encoded leaf certificate.
    pub cert_der: CertificateDer<'static>,
    /// The DER-encoded (PKCS#8) leaf private key.
    pub key_der: PrivatePkcs8KeyDer<'static>,
    /// When this leaf was minted, for cache TTL bookkeeping.
    pub minted_at: SystemTime,
}

impl fmt::Debug for LeafCert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafCert")
            .field("minted_at", &self.minted_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_self_signed_ca_and_mints_leaf() {
        let ca = CaMaterial::generate_self_signed("viaduct-test").unwrap();
        let leaf = ca
            .mint_leaf("secret.example", "viaduct-test", Duration::from_secs(3600))
            .unwrap();
        assert!(!leaf.cert_der.is_empty());
        assert!(!leaf.key_der.secret_pkcs8_der().is_empty());
    }

    #[test]
    fn mints_distinct_leaves_for_distinct_hosts() {
        let ca = CaMaterial::generate_self_signed("viaduct-test").unwrap();
        let a = ca
            .mint_leaf("a.example", "viaduct-test", Duration::from_secs(60))
            .unwrap();
        let b = ca
            .mint_leaf("b.example", "viaduct-test", Duration::from_secs(60))
            .unwrap();
        assert_ne!(a.cert_der, b.cert_der);
    }
}
