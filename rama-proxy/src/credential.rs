//! HTTP Basic credentials for upstream/site authentication, attached to
//! outbound requests by host/port, with wildcard fallback.

use std::collections::HashMap;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rama_net::address::Host;

/// A username/password pair, ready to be base64-encoded into a
/// `Basic` `Authorization`/`Proxy-Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredential {
    username: String,
    password: String,
}

impl BasicCredential {
    /// Create a credential from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Render as the value that follows `Basic ` in an
    /// `Authorization`/`Proxy-Authorization` header.
    pub fn to_header_value(&self) -> String {
        BASE64.encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Display for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:***", self.username)
    }
}

/// A `(host, port)` match key, where either side may be the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HostKey {
    Any,
    Exact(Host),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PortKey {
    Any,
    Exact(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    host: HostKey,
    port: PortKey,
}

/// Host/port-keyed credential table with wildcard precedence: an exact
/// `host:port` entry wins over `host:*`, which wins over `*:port`, which
/// wins over the bare `*:*` fallback.
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    entries: HashMap<Key, BasicCredential>,
}

impl CredentialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential for an exact host and port.
    pub fn with_host_port(mut self, host: Host, port: u16, credential: BasicCredential) -> Self {
        self.entries.insert(
            Key {
                host: HostKey::Exact(host),
                port: PortKey::Exact(port),
            },
            credential,
        );
        self
    }

    /// Register a credential for a host, any port.
    pub fn with_host(mut self, host: Host, credential: BasicCredential) -> Self {
        self.entries.insert(
            Key {
                host: HostKey::Exact(host),
                port: PortKey::Any,
            },
            credential,
        );
        self
    }

    /// Register a credential for a port, any host.
    pub fn with_port(mut self, port: u16, credential: BasicCredential) -> Self {
        self.entries.insert(
            Key {
                host: HostKey::Any,
                port: PortKey::Exact(port),
            },
            credential,
        );
        self
    }

    /// Register the fallback credential, matching any host and port.
    pub fn with_default(mut self, credential: BasicCredential) -> Self {
        self.entries.insert(
            Key {
                host: HostKey::Any,
                port: PortKey::Any,
            },
            credential,
        );
        self
    }

    /// Look up the most specific credential matching `host:port`.
    pub fn lookup(&self, host: &Host, port: u16) -> Option<&BasicCredential> {
        let candidates = [
            Key {
                host: HostKey::Exact(host.clone()),
                port: PortKey::Exact(port),
            },
            Key {
                host: HostKey::Exact(host.clone()),
                port: PortKey::Any,
            },
            Key {
                host: HostKey::Any,
                port: PortKey::Exact(port),
            },
            Key {
                host: HostKey::Any,
                port: PortKey::Any,
            },
        ];
        candidates
            .into_iter()
            .find_map(|key| self.entries.get(&key).map(|cred| (key, cred)))
            .map(|(_, cred)| cred)
    }

    /// True if any registered entry could ever match (diagnostic helper).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rama_net::address::Domain;

    fn host(s: &str) -> Host {
        Host::Name(Domain::from_static(s))
    }

    #[test]
    fn exact_host_and_port_wins_over_everything() {
        let table = CredentialTable::new()
            .with_default(BasicCredential::new("default", "p"))
            .with_port(443, BasicCredential::new("port-only", "p"))
            .with_host(host("example.com"), BasicCredential::new("host-only", "p"))
            .with_host_port(host("example.com"), 443, BasicCredential::new("exact", "p"));

        let found = table.lookup(&host("example.com"), 443).unwrap();
        assert_eq!(found.username(), "exact");
    }

    #[test]
    fn host_only_wins_over_port_only_and_default() {
        let table = CredentialTable::new()
            .with_default(BasicCredential::new("default", "p"))
            .with_port(8080, BasicCredential::new("port-only", "p"))
            .with_host(host("example.com"), BasicCredential::new("host-only", "p"));

        let found = table.lookup(&host("example.com"), 8080).unwrap();
        assert_eq!(found.username(), "host-only");
    }

    #[test]
    fn port_only_wins_over_default() {
        let table = CredentialTable::new()
            .with_default(BasicCredential::new("default", "p"))
            .with_port(8080, BasicCredential::new("port-only", "p"));

        let found = table.lookup(&host("other.example"), 8080).unwrap();
        assert_eq!(found.username(), "port-only");
    }

    #[test]
    fn falls_back_to_default() {
        let table = CredentialTable::new().with_default(BasicCredential::new("default", "p"));
        let found = table.lookup(&host("anything.example"), 1).unwrap();
        assert_eq!(found.username(), "default");
    }

    #[test]
    fn no_match_without_default() {
        let table = CredentialTable::new().with_port(443, BasicCredential::new("p", "p"));
        assert!(table.lookup(&host("anything.example"), 80).is_none());
    }

    #[test]
    fn header_value_is_base64_of_user_colon_pass() {
        let cred = BasicCredential::new("Aladdin", "open sesame");
        assert_eq!(cred.to_header_value(), "QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }
}
