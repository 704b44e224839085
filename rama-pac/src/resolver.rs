//! DNS and local-IP enumeration used by the native PAC helper bindings
//! (`dnsResolve`, `dnsResolveEx`, `myIpAddress`, `myIpAddressEx`,
//! `isResolvableEx`, `isInNetEx`).
//!
//! The PAC VM is single-threaded and synchronous, so resolution here is
//! synchronous too; it runs on whichever thread drives the evaluator
//! (typically a blocking-pool thread, since callers acquire evaluators from
//! [`crate::pool::EvaluatorPool`] outside of the async reactor).

use std::net::{IpAddr, ToSocketAddrs as _, UdpSocket};

/// Name resolution and local-address enumeration, injectable so tests can
/// supply deterministic results instead of hitting the real network — the
/// "test hooks for DNS and local-IP enumeration" the PAC script bundle
/// carries.
pub trait NameResolver: Send + Sync {
    /// Resolve `host` to all of its addresses. Empty on failure.
    fn resolve_all(&self, host: &str) -> Vec<IpAddr>;

    /// Enumerate this host's "up" addresses, globally-unicast only.
    fn local_addresses(&self) -> Vec<IpAddr>;
}

/// The real, OS-backed resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn resolve_all(&self, host: &str) -> Vec<IpAddr> {
        (host, 0)
            .to_socket_addrs()
            .map(|it| it.map(|sa| sa.ip()).collect())
            .unwrap_or_default()
    }

    fn local_addresses(&self) -> Vec<IpAddr> {
        // No portable stdlib interface-enumeration API exists; instead we
        // learn the outbound-facing local address the same way Go's
        // net.DialUDP-based tricks do: open a UDP socket, "connect" it to a
        // well-known external address (no packets are actually sent for
        // UDP connect), and read back the address the kernel picked.
        let probe = |target: &str| -> Option<IpAddr> {
            let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
            socket.connect(target).ok()?;
            socket.local_addr().ok().map(|a| a.ip())
        };
        let mut addrs = Vec::new();
        if let Some(v6) = probe("[2001:4860:4860::8888]:80") {
            addrs.push(v6);
        }
        if let Some(v4) = probe("8.8.8.8:80") {
            addrs.push(v4);
        }
        addrs.retain(is_globally_unicast);
        addrs
    }
}

fn is_globally_unicast(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            !v4.is_loopback() && !v4.is_link_local() && !v4.is_unspecified() && !v4.is_multicast()
        }
        IpAddr::V6(v6) => !v6.is_loopback() && !v6.is_unspecified() && !v6.is_multicast(),
    }
}

/// A fixed-answer resolver for deterministic PAC evaluation tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: std::collections::HashMap<String, Vec<IpAddr>>,
    local: Vec<IpAddr>,
}

impl StaticResolver {
    /// Create an empty static resolver (every lookup fails, no local IPs).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fixed answer for `host`.
    pub fn with_host(mut self, host: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        self.hosts.insert(host.into(), addrs);
        self
    }

    /// Record the fixed set of local addresses returned by `myIpAddress`.
    pub fn with_local_addresses(mut self, addrs: Vec<IpAddr>) -> Self {
        self.local = addrs;
        self
    }
}

impl NameResolver for StaticResolver {
    fn resolve_all(&self, host: &str) -> Vec<IpAddr> {
        self.hosts.get(host).cloned().unwrap_or_default()
    }

    fn local_addresses(&self) -> Vec<IpAddr> {
        self.local.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_resolver_returns_configured_hosts() {
        let resolver = StaticResolver::new().with_host("example.com", vec!["1.2.3.4".parse().unwrap()]);
        assert_eq!(
            resolver.resolve_all("example.com"),
            vec!["1.2.3.4".parse::<IpAddr>().unwrap()]
        );
        assert!(resolver.resolve_all("unknown.example").is_empty());
    }
}
