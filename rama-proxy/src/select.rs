//! Proxy-selection pipeline: decides, per request, whether to go direct, via
//! a fixed upstream, or via a PAC-evaluated entry, and applies the
//! localhost bypass policy.
//!
//! Grounded on `SPEC_FULL.md` §4.5; the PAC branch walks the evaluator's
//! return string left to right exactly like the Mozilla PAC contract,
//! skipping malformed entries rather than failing the request (§8 S5).

use std::fmt;
use std::sync::Arc;

use rama_pac::{EvaluatorPool, PacError};

use crate::entry::ProxyEntry;

/// How to treat a target hostname that resolves to loopback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalhostPolicy {
    /// Reject the request outright (`403`).
    Deny,
    /// Treat loopback like any other host.
    #[default]
    Allow,
    /// Force direct connection for this request, ignoring the configured
    /// mode.
    Direct,
}

/// The proxy's configured mode of operation.
#[derive(Clone)]
pub enum ProxyMode {
    /// Always connect directly to the origin.
    Direct,
    /// Always use one fixed upstream entry.
    Upstream(ProxyEntry),
    /// Consult a PAC evaluator pool per request.
    Pac(Arc<EvaluatorPool>),
}

impl fmt::Debug for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("ProxyMode::Direct"),
            Self::Upstream(entry) => write!(f, "ProxyMode::Upstream({entry})"),
            Self::Pac(_) => f.write_str("ProxyMode::Pac(..)"),
        }
    }
}

/// The localhost policy rejected this request before any upstream contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalhostDenied;

impl fmt::Display for LocalhostDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request target is loopback and the localhost policy denies it")
    }
}

impl std::error::Error for LocalhostDenied {}

/// Decides the next hop for each request.
#[derive(Debug, Clone)]
pub struct ProxySelector {
    mode: ProxyMode,
    localhost_policy: LocalhostPolicy,
}

impl ProxySelector {
    pub fn new(mode: ProxyMode) -> Self {
        Self {
            mode,
            localhost_policy: LocalhostPolicy::default(),
        }
    }

    pub fn direct() -> Self {
        Self::new(ProxyMode::Direct)
    }

    pub fn upstream(entry: ProxyEntry) -> Self {
        Self::new(ProxyMode::Upstream(entry))
    }

    pub fn pac(pool: Arc<EvaluatorPool>) -> Self {
        Self::new(ProxyMode::Pac(pool))
    }

    pub fn with_localhost_policy(mut self, policy: LocalhostPolicy) -> Self {
        self.localhost_policy = policy;
        self
    }

    /// Select the entry to use for a request to `url`/`hostname`.
    ///
    /// `is_loopback` is supplied by the caller (the dispatcher already knows
    /// the resolved target address); this module makes no DNS calls of its
    /// own.
    pub async fn select(&self, url: &str, hostname: &str, is_loopback: bool) -> Result<ProxyEntry, LocalhostDenied> {
        if is_loopback {
            match self.localhost_policy {
                LocalhostPolicy::Deny => return Err(LocalhostDenied),
                LocalhostPolicy::Direct => return Ok(ProxyEntry::Direct),
                LocalhostPolicy::Allow => {}
            }
        }

        match &self.mode {
            ProxyMode::Direct => Ok(ProxyEntry::Direct),
            ProxyMode::Upstream(entry) => Ok(entry.clone()),
            ProxyMode::Pac(pool) => Ok(self.evaluate_pac(pool, url, hostname).await),
        }
    }

    async fn evaluate_pac(&self, pool: &EvaluatorPool, url: &str, hostname: &str) -> ProxyEntry {
        match pool.evaluate(url, hostname).await {
            Ok(raw) => first_valid_entry(&raw),
            Err(err) => {
                log_script_failure(&err);
                ProxyEntry::Direct
            }
        }
    }
}

fn log_script_failure(err: &PacError) {
    tracing::warn!(target: "rama::proxy::select", error = %err, "PAC evaluation failed, falling back to DIRECT");
}

/// Walk a PAC return string left to right, returning the first entry that
/// parses. Malformed entries (bad address syntax) are skipped rather than
/// failing the request; an unknown tag parses as `DIRECT` (per spec §6) and
/// so is never skipped — a leading unknown-tag entry wins outright, the same
/// as a leading `DIRECT` would. An entirely empty or unparseable string
/// resolves to `DIRECT`.
fn first_valid_entry(raw: &str) -> ProxyEntry {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .find_map(|part| part.parse::<ProxyEntry>().ok())
        .unwrap_or(ProxyEntry::Direct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn direct_mode_always_returns_direct() {
        let selector = ProxySelector::direct();
        let entry = selector.select("http://example.com/", "example.com", false).await.unwrap();
        assert_eq!(entry, ProxyEntry::Direct);
    }

    #[tokio::test]
    async fn upstream_mode_returns_configured_entry() {
        let configured: ProxyEntry = "PROXY up.example:8080".parse().unwrap();
        let selector = ProxySelector::upstream(configured.clone());
        let entry = selector.select("http://example.com/", "example.com", false).await.unwrap();
        assert_eq!(entry, configured);
    }

    #[tokio::test]
    async fn localhost_deny_rejects_loopback() {
        let selector = ProxySelector::direct().with_localhost_policy(LocalhostPolicy::Deny);
        let result = selector.select("http://localhost/", "localhost", true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn localhost_direct_overrides_upstream_mode() {
        let configured: ProxyEntry = "PROXY up.example:8080".parse().unwrap();
        let selector = ProxySelector::upstream(configured).with_localhost_policy(LocalhostPolicy::Direct);
        let entry = selector.select("http://localhost/", "localhost", true).await.unwrap();
        assert_eq!(entry, ProxyEntry::Direct);
    }

    #[tokio::test]
    async fn localhost_allow_ignores_loopback_ness() {
        let configured: ProxyEntry = "PROXY up.example:8080".parse().unwrap();
        let selector = ProxySelector::upstream(configured.clone()).with_localhost_policy(LocalhostPolicy::Allow);
        let entry = selector.select("http://localhost/", "localhost", true).await.unwrap();
        assert_eq!(entry, configured);
    }

    #[tokio::test]
    async fn pac_mode_evaluates_and_uses_first_entry() {
        let bundle = rama_pac::ScriptBundle::new(
            "function FindProxyForURL(url, host) { if (shExpMatch(host, '*.internal')) return 'DIRECT'; return 'PROXY up.example:1080; DIRECT'; }"
                .to_owned(),
        );
        let pool = Arc::new(EvaluatorPool::new(bundle, 1).unwrap());
        let selector = ProxySelector::pac(pool);

        let direct = selector.select("http://foo.internal/", "foo.internal", false).await.unwrap();
        assert_eq!(direct, ProxyEntry::Direct);

        let upstream = selector.select("http://www.example.com/", "www.example.com", false).await.unwrap();
        assert!(matches!(upstream, ProxyEntry::Proxy { .. }));
    }

    #[test]
    fn first_valid_entry_skips_malformed_host() {
        assert_eq!(first_valid_entry("PROXY :8080; DIRECT"), ProxyEntry::Direct);
    }

    #[test]
    fn first_valid_entry_falls_back_to_direct_when_all_malformed() {
        assert_eq!(first_valid_entry("PROXY :8080; BOGUS x"), ProxyEntry::Direct);
    }

    #[test]
    fn first_valid_entry_empty_string_is_direct() {
        assert_eq!(first_valid_entry(""), ProxyEntry::Direct);
    }

    #[test]
    fn first_valid_entry_leading_unknown_tag_wins_over_later_valid_proxy() {
        // An unknown tag parses as DIRECT, not as malformed — so "BOGUS x"
        // is a successful parse and "PROXY good:8080" is never reached.
        assert_eq!(first_valid_entry("BOGUS x; PROXY good:8080"), ProxyEntry::Direct);
    }
}
