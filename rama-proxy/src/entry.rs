//! Proxy entries and entry lists in Mozilla PAC grammar
//! (`"PROXY host:port; SOCKS host:port; DIRECT"`), as returned by
//! `FindProxyForURL` or configured directly for upstream/static modes.
//!
//! Grounded on `rama_net::address::HostWithPort`/`Host` for address parsing;
//! the `user:pass@` extension on `PROXY`/`SOCKS` entries is a deliberate
//! addition beyond the Mozilla grammar (see `DESIGN.md`).

use std::fmt;
use std::str::FromStr;

use rama_net::address::HostWithPort;

use crate::credential::BasicCredential;

/// A single resolved directive from a PAC result (or a static proxy
/// configuration): either connect directly, or via a named proxy kind at a
/// given address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEntry {
    /// Connect to the origin directly, bypassing any proxy.
    Direct,
    /// Connect via an HTTP forward proxy.
    Proxy {
        address: HostWithPort,
        credential: Option<BasicCredential>,
    },
    /// Connect via an HTTP forward proxy reached over TLS (the proxy's own
    /// front end terminates TLS, as opposed to `Proxy`'s plain-TCP-then-`CONNECT`).
    Https {
        address: HostWithPort,
        credential: Option<BasicCredential>,
    },
    /// Connect via a SOCKS proxy (version unspecified by the grammar; callers
    /// default to SOCKS5).
    Socks {
        address: HostWithPort,
        credential: Option<BasicCredential>,
    },
}

/// Failure parsing a PAC entry or entry list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProxyEntryError(String);

impl fmt::Display for ParseProxyEntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid PAC proxy entry: {}", self.0)
    }
}

impl std::error::Error for ParseProxyEntryError {}

impl FromStr for ProxyEntry {
    type Err = ParseProxyEntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (keyword, rest) = match s.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (s, ""),
        };

        match keyword.to_ascii_uppercase().as_str() {
            "DIRECT" => {
                if rest.is_empty() {
                    Ok(Self::Direct)
                } else {
                    Err(ParseProxyEntryError(format!(
                        "DIRECT takes no address, got trailing `{rest}`"
                    )))
                }
            }
            "PROXY" | "HTTP" => {
                let (address, credential) = parse_authority(rest)?;
                Ok(Self::Proxy { address, credential })
            }
            "HTTPS" => {
                let (address, credential) = parse_authority(rest)?;
                Ok(Self::Https { address, credential })
            }
            "SOCKS" | "SOCKS5" | "SOCKS4" => {
                let (address, credential) = parse_authority(rest)?;
                Ok(Self::Socks { address, credential })
            }
            // Per spec §6, an unknown tag is treated as DIRECT rather than
            // rejected outright — a PAC script is untrusted input, and a
            // forward-compatible tag this evaluator doesn't know about yet
            // must not make the whole result unusable.
            _other => Ok(Self::Direct),
        }
    }
}

fn parse_authority(rest: &str) -> Result<(HostWithPort, Option<BasicCredential>), ParseProxyEntryError> {
    if rest.is_empty() {
        return Err(ParseProxyEntryError("missing host:port".to_owned()));
    }
    let (credential, authority) = match rest.rsplit_once('@') {
        Some((userinfo, authority)) => {
            let (username, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));
            (Some(BasicCredential::new(username, password)), authority)
        }
        None => (None, rest),
    };
    let address = HostWithPort::try_from(authority)
        .map_err(|e| ParseProxyEntryError(format!("invalid address `{authority}`: {e}")))?;
    Ok((address, credential))
}

impl fmt::Display for ProxyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "DIRECT"),
            Self::Proxy { address, .. } => write!(f, "PROXY {address}"),
            Self::Https { address, .. } => write!(f, "HTTPS {address}"),
            Self::Socks { address, .. } => write!(f, "SOCKS {address}"),
        }
    }
}

/// An ordered list of candidate entries, as returned by a single
/// `FindProxyForURL` evaluation (`"PROXY a:1; PROXY b:2; DIRECT"`).
///
/// Callers try entries in order, falling through to the next on connection
/// failure; see spec §4.1's dispatcher fallback behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEntryList(Vec<ProxyEntry>);

impl ProxyEntryList {
    pub fn entries(&self) -> &[ProxyEntry] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<ProxyEntry> {
        self.0
    }
}

impl FromStr for ProxyEntryList {
    type Err = ParseProxyEntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries = s
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ProxyEntry::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if entries.is_empty() {
            return Err(ParseProxyEntryError("empty proxy entry list".to_owned()));
        }
        Ok(Self(entries))
    }
}

impl fmt::Display for ProxyEntryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<_> = self.0.iter().map(ProxyEntry::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direct() {
        assert_eq!("DIRECT".parse::<ProxyEntry>().unwrap(), ProxyEntry::Direct);
    }

    #[test]
    fn parses_proxy_with_host_port() {
        let entry: ProxyEntry = "PROXY proxy.example.com:8080".parse().unwrap();
        match entry {
            ProxyEntry::Proxy { address, credential } => {
                assert_eq!(address.port, 8080);
                assert!(credential.is_none());
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn parses_socks_entry() {
        let entry: ProxyEntry = "SOCKS socks.example.com:1080".parse().unwrap();
        assert!(matches!(entry, ProxyEntry::Socks { .. }));
    }

    #[test]
    fn parses_proxy_with_credential_extension() {
        let entry: ProxyEntry = "PROXY alice:s3cret@proxy.example.com:8080".parse().unwrap();
        match entry {
            ProxyEntry::Proxy { credential: Some(cred), .. } => {
                assert_eq!(cred.username(), "alice");
                assert_eq!(cred.password(), "s3cret");
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn parses_https_entry() {
        let entry: ProxyEntry = "HTTPS proxy.example.com:443".parse().unwrap();
        match entry {
            ProxyEntry::Https { address, credential } => {
                assert_eq!(address.port, 443);
                assert!(credential.is_none());
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn unknown_keyword_is_treated_as_direct() {
        assert_eq!("BOGUS example.com:80".parse::<ProxyEntry>().unwrap(), ProxyEntry::Direct);
    }

    #[test]
    fn rejects_direct_with_trailing_address() {
        assert!("DIRECT example.com:80".parse::<ProxyEntry>().is_err());
    }

    #[test]
    fn parses_entry_list_with_fallback() {
        let list: ProxyEntryList = "PROXY a.example:8080; SOCKS b.example:1080; DIRECT"
            .parse()
            .unwrap();
        assert_eq!(list.entries().len(), 3);
        assert_eq!(list.entries()[2], ProxyEntry::Direct);
    }

    #[test]
    fn rejects_empty_list() {
        assert!("   ".parse::<ProxyEntryList>().is_err());
    }
}
