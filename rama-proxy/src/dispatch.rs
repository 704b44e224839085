//! Outbound request dispatch: connect to the resolved next hop and forward
//! one HTTP request/response exchange, stripping hop-by-hop headers and
//! attaching credentials.
//!
//! The outbound HTTP/1.1 roundtrip itself is `crate::http1::roundtrip`: no
//! usable client handshake exists anywhere in this workspace (the natural
//! candidate, `rama_http_core::client::conn::http1`, is declared by
//! `rama-http-core`'s `client::conn` module but ships no implementation —
//! only the server side and HTTP/2 client side exist), so `rama-proxy` talks
//! the wire protocol itself (see `DESIGN.md`).

use std::fmt;
use std::time::Duration;

use rama_http_types::{Body, Request, Response, header};
use rama_tls_rustls::connect::ConnectError;
use tokio::net::TcpStream;

use crate::credential::{BasicCredential, CredentialTable};
use crate::entry::ProxyEntry;
use crate::headers::{basic_credential_header_value, strip_hop_by_hop_request_headers, strip_hop_by_hop_response_headers};
use crate::http1;

/// A next-hop stream whose concrete type depends on the selected entry: a
/// plain `TcpStream` for `Direct`/`Proxy`/`Socks`, a `TlsStream<TcpStream>`
/// for `Https`. Boxed rather than made generic since `Dispatcher::dispatch`
/// needs one concrete return type across all four entry kinds; grounded on
/// `rama-http/src/io/upgrade.rs`'s own `Box<dyn Stream + Unpin>` storage for
/// the same kind of heterogeneous-stream problem.
type UpstreamIo = Box<dyn rama_core::stream::Stream + Unpin + Sync>;

/// Failure dispatching a request to the chosen next hop.
#[derive(Debug)]
pub enum DispatchError {
    /// The request carries no usable target address (no authority, and no
    /// scheme-default port to fall back on).
    NoAddress(String),
    /// Connecting to the next hop timed out.
    ConnectTimeout,
    /// The TCP connect itself failed.
    Connect(std::io::Error),
    /// Negotiating the SOCKS5 `CONNECT` with a `SOCKS` entry's proxy failed.
    Socks(rama_socks5::Socks5Error),
    /// The TLS handshake with an `HTTPS` entry's proxy failed.
    Tls(ConnectError),
    /// Sending the request or receiving the response failed.
    Send(http1::Http1Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAddress(msg) => write!(f, "no usable target address: {msg}"),
            Self::ConnectTimeout => write!(f, "connecting to the next hop timed out"),
            Self::Connect(e) => write!(f, "connecting to the next hop failed: {e}"),
            Self::Socks(e) => write!(f, "SOCKS5 negotiation with the upstream proxy failed: {e}"),
            Self::Tls(e) => write!(f, "TLS to the upstream proxy failed: {e}"),
            Self::Send(e) => write!(f, "forwarding the request failed: {e}"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Forwards one request to whichever next hop `entry` resolves to.
pub struct Dispatcher {
    site_credentials: CredentialTable,
    upstream_credentials: CredentialTable,
    connect_timeout: Duration,
}

impl Dispatcher {
    pub fn new(site_credentials: CredentialTable) -> Self {
        Self {
            site_credentials,
            upstream_credentials: CredentialTable::new(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Credentials applied (as `Proxy-Authorization`, or the SOCKS5 auth
    /// subnegotiation) to a selected `PROXY`/`SOCKS` entry's own next-hop
    /// address, matched by that address's host/port, when the entry carries
    /// no credential of its own (e.g. a PAC result or `--upstream` URL with
    /// no embedded `user:pass@`).
    pub fn with_upstream_credentials(mut self, upstream_credentials: CredentialTable) -> Self {
        self.upstream_credentials = upstream_credentials;
        self
    }

    /// Forward `req` to `entry`'s next hop, returning the upstream's
    /// response with hop-by-hop headers already stripped.
    ///
    /// Per spec: a matching site credential (keyed by the request's own
    /// target host/port) is attached as `Authorization`, independent of
    /// `entry`; an entry-level `PROXY`/`SOCKS` credential authenticates to
    /// the next hop itself (`Proxy-Authorization` header for `PROXY`, the
    /// SOCKS5 auth subnegotiation for `SOCKS`).
    pub async fn dispatch(&self, entry: &ProxyEntry, mut req: Request<Body>) -> Result<Response<Body>, DispatchError> {
        strip_hop_by_hop_request_headers(req.headers_mut());

        let (target_host, target_port) = request_target(&req)?;
        if let Some(site_credential) = self.site_credential(&target_host, target_port) {
            req.headers_mut().insert(header::AUTHORIZATION, basic_credential_header_value(site_credential));
        }
        let upstream_credential = self.upstream_credential_for(entry);
        if matches!(entry, ProxyEntry::Proxy { .. } | ProxyEntry::Https { .. }) {
            if let Some(credential) = upstream_credential {
                apply_proxy_entry_credential(&mut req, credential);
            }
        }

        let stream = self.open_stream(entry, &target_host, target_port, upstream_credential).await?;

        let mut resp = http1::roundtrip(stream, req).await.map_err(DispatchError::Send)?;
        strip_hop_by_hop_response_headers(resp.headers_mut());
        Ok(resp)
    }

    /// Establish the connection `entry` resolves to, already positioned at
    /// the start of the plaintext byte stream to `target_host:target_port`
    /// (i.e. the `SOCKS` handshake, if any, has already completed, and for
    /// `Https` the TLS handshake to the proxy's own front end has already
    /// completed).
    async fn open_stream(
        &self,
        entry: &ProxyEntry,
        target_host: &str,
        target_port: u16,
        upstream_credential: Option<&BasicCredential>,
    ) -> Result<UpstreamIo, DispatchError> {
        match entry {
            ProxyEntry::Direct => Ok(Box::new(self.connect(target_host, target_port).await?)),
            ProxyEntry::Proxy { address, .. } => Ok(Box::new(self.connect(&address.host.to_string(), address.port).await?)),
            ProxyEntry::Https { address, .. } => {
                let stream = self.connect(&address.host.to_string(), address.port).await?;
                let connector = rama_tls_rustls::connect::build_connector().map_err(DispatchError::Tls)?;
                let tls = rama_tls_rustls::connect::connect(&connector, &address.host.to_string(), stream)
                    .await
                    .map_err(DispatchError::Tls)?;
                Ok(Box::new(tls))
            }
            ProxyEntry::Socks { address, .. } => {
                let mut stream = self.connect(&address.host.to_string(), address.port).await?;
                let auth = upstream_credential.map(|c| (c.username(), c.password()));
                rama_socks5::connect(&mut stream, target_host, target_port, auth)
                    .await
                    .map_err(DispatchError::Socks)?;
                Ok(Box::new(stream))
            }
        }
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, DispatchError> {
        tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| DispatchError::ConnectTimeout)?
            .map_err(DispatchError::Connect)
    }

    fn site_credential(&self, host: &str, port: u16) -> Option<&BasicCredential> {
        let host = rama_net::address::Host::try_from(host).ok()?;
        self.site_credentials.lookup(&host, port)
    }

    /// The credential to use for `entry`'s own next hop: its embedded
    /// credential if it has one, else a table lookup keyed by the entry's
    /// proxy address.
    fn upstream_credential_for(&self, entry: &ProxyEntry) -> Option<&BasicCredential> {
        match entry {
            ProxyEntry::Direct => None,
            ProxyEntry::Proxy { address, credential } | ProxyEntry::Https { address, credential } | ProxyEntry::Socks { address, credential } => {
                credential.as_ref().or_else(|| self.upstream_credentials.lookup(&address.host, address.port))
            }
        }
    }
}

/// Proxy-authorization header insertion for a `PROXY`/`HTTP` entry's own
/// embedded credential, applied before dialing the next hop.
fn apply_proxy_entry_credential(req: &mut Request<Body>, credential: &BasicCredential) {
    req.headers_mut().insert(header::PROXY_AUTHORIZATION, basic_credential_header_value(credential));
}

fn request_target(req: &Request<Body>) -> Result<(String, u16), DispatchError> {
    let authority = req
        .uri()
        .authority()
        .ok_or_else(|| DispatchError::NoAddress("request URI has no authority".to_owned()))?;
    let host = authority.host().to_owned();
    let port = authority
        .port_u16()
        .or_else(|| default_port_for_scheme(req.uri().scheme_str()))
        .ok_or_else(|| DispatchError::NoAddress("no port and no known scheme default".to_owned()))?;
    Ok((host, port))
}

fn default_port_for_scheme(scheme: Option<&str>) -> Option<u16> {
    match scheme {
        Some("http") => Some(80),
        Some("https") => Some(443),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_target_uses_request_authority() {
        let req = Request::builder()
            .uri("http://example.com/path")
            .body(Body::empty())
            .unwrap();
        let (host, port) = request_target(&req).unwrap();
        assert_eq!(host, "example.com");
        assert_eq!(port, 80);
    }

    #[test]
    fn request_target_without_authority_is_an_error() {
        let req = Request::builder().uri("/path").body(Body::empty()).unwrap();
        assert!(request_target(&req).is_err());
    }

    #[test]
    fn https_scheme_defaults_to_port_443() {
        let req = Request::builder()
            .uri("https://example.com/path")
            .body(Body::empty())
            .unwrap();
        let (_, port) = request_target(&req).unwrap();
        assert_eq!(port, 443);
    }

    #[test]
    fn upstream_credential_for_prefers_entry_embedded_credential() {
        let dispatcher = Dispatcher::new(CredentialTable::new())
            .with_upstream_credentials(CredentialTable::new().with_default(BasicCredential::new("table", "p")));
        let entry: ProxyEntry = "PROXY alice:s3cret@proxy.example.com:8080".parse().unwrap();
        let credential = dispatcher.upstream_credential_for(&entry).unwrap();
        assert_eq!(credential.username(), "alice");
    }

    #[test]
    fn upstream_credential_for_falls_back_to_table_lookup() {
        let dispatcher = Dispatcher::new(CredentialTable::new())
            .with_upstream_credentials(CredentialTable::new().with_default(BasicCredential::new("table", "p")));
        let entry: ProxyEntry = "PROXY proxy.example.com:8080".parse().unwrap();
        let credential = dispatcher.upstream_credential_for(&entry).unwrap();
        assert_eq!(credential.username(), "table");
    }

    #[test]
    fn upstream_credential_for_direct_entry_is_none() {
        let dispatcher = Dispatcher::new(CredentialTable::new())
            .with_upstream_credentials(CredentialTable::new().with_default(BasicCredential::new("table", "p")));
        assert!(dispatcher.upstream_credential_for(&ProxyEntry::Direct).is_none());
    }

    #[test]
    fn upstream_credential_for_https_entry_falls_back_to_table_lookup() {
        let dispatcher = Dispatcher::new(CredentialTable::new())
            .with_upstream_credentials(CredentialTable::new().with_default(BasicCredential::new("table", "p")));
        let entry: ProxyEntry = "HTTPS proxy.example.com:443".parse().unwrap();
        let credential = dispatcher.upstream_credential_for(&entry).unwrap();
        assert_eq!(credential.username(), "table");
    }

    #[test]
    fn proxy_entry_credential_is_attached_as_proxy_authorization() {
        let mut req = Request::builder()
            .uri("http://example.com/path")
            .body(Body::empty())
            .unwrap();
        let credential = BasicCredential::new("Aladdin", "open sesame");
        apply_proxy_entry_credential(&mut req, &credential);
        let value = req.headers().get(header::PROXY_AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }
}
