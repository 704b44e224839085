//! CONNECT tunnel engine: once the dispatcher has hijacked the client
//! connection (via `rama_http::io::upgrade`), establish the outbound leg —
//! direct, or via an upstream HTTP proxy's own `CONNECT` — and splice the two
//! byte streams.
//!
//! Grounded on `viaduct-cli`'s original `proxy::http_connect_proxy` (TCP
//! connect + `tokio::io::copy_bidirectional`); generalized here to also
//! tunnel through an upstream `PROXY` entry by issuing a nested `CONNECT`
//! before splicing.

use std::fmt;
use std::time::Duration;

use rama_http::io::upgrade::Upgraded;
use rama_tls_rustls::connect::ConnectError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::credential::BasicCredential;
use crate::entry::ProxyEntry;
use crate::headers::basic_credential_header_value;

/// A next-hop stream whose concrete type depends on the selected entry; see
/// `crate::dispatch`'s identical alias for the same reasoning. No `Sync`
/// bound needed here, unlike the dispatcher's: `copy_bidirectional` only
/// needs `AsyncRead + AsyncWrite + Unpin`. `pub(crate)` so `crate::h2` can
/// dial the same way for an HTTP/2 `CONNECT` stream's outbound leg.
pub(crate) type UpstreamIo = Box<dyn rama_core::stream::Stream + Unpin>;

/// Failure establishing or running the outbound leg of a tunnel.
#[derive(Debug)]
pub enum TunnelError {
    /// The entry names no usable address.
    NoAddress(String),
    /// Connecting to the next hop timed out.
    ConnectTimeout,
    /// The TCP connect to the next hop failed.
    Connect(std::io::Error),
    /// The upstream proxy did not answer `CONNECT` with success.
    UpstreamRefused(String),
    /// A read/write error while negotiating the nested `CONNECT`.
    Io(std::io::Error),
    /// Negotiating the SOCKS5 `CONNECT` with a `SOCKS` entry's proxy failed.
    Socks(rama_socks5::Socks5Error),
    /// The TLS handshake with an `HTTPS` entry's proxy failed.
    Tls(ConnectError),
    /// An HTTP/2 framing error while relaying an extended `CONNECT` stream.
    Http2(::h2::Error),
}

impl fmt::Display for TunnelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAddress(msg) => write!(f, "no usable next-hop address: {msg}"),
            Self::ConnectTimeout => write!(f, "connecting to the next hop timed out"),
            Self::Connect(e) => write!(f, "connecting to the next hop failed: {e}"),
            Self::UpstreamRefused(msg) => write!(f, "upstream proxy refused CONNECT: {msg}"),
            Self::Io(e) => write!(f, "tunnel negotiation I/O error: {e}"),
            Self::Socks(e) => write!(f, "SOCKS5 negotiation with the upstream proxy failed: {e}"),
            Self::Tls(e) => write!(f, "TLS to the upstream proxy failed: {e}"),
            Self::Http2(e) => write!(f, "HTTP/2 tunnel stream error: {e}"),
        }
    }
}

impl std::error::Error for TunnelError {}

/// Establish the outbound leg for `entry` targeting `target_host:target_port`
/// and splice it with the already-hijacked `client` stream until either side
/// closes.
pub async fn run(
    entry: &ProxyEntry,
    target_host: &str,
    target_port: u16,
    connect_timeout: Duration,
    mut client: Upgraded,
) -> Result<(), TunnelError> {
    let mut upstream = dial(entry, target_host, target_port, connect_timeout).await?;

    match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
        Ok(_) => Ok(()),
        Err(err) if is_benign_disconnect(&err) => Ok(()),
        Err(err) => Err(TunnelError::Io(err)),
    }
}

/// Establish the outbound leg for `entry` without yet splicing it to
/// anything. Shared by [`run`] (HTTP/1.1 raw-socket splice) and
/// `crate::h2` (HTTP/2 `CONNECT` stream relay), which differ only in how
/// the *client* side is represented.
pub(crate) async fn dial(entry: &ProxyEntry, target_host: &str, target_port: u16, connect_timeout: Duration) -> Result<UpstreamIo, TunnelError> {
    Ok(match entry {
        ProxyEntry::Direct => Box::new(connect(target_host, target_port, connect_timeout).await?),
        ProxyEntry::Proxy { address, credential } => {
            let mut stream = connect(&address.host.to_string(), address.port, connect_timeout).await?;
            negotiate_connect(&mut stream, target_host, target_port, credential.as_ref()).await?;
            Box::new(stream)
        }
        ProxyEntry::Https { address, credential } => {
            let stream = connect(&address.host.to_string(), address.port, connect_timeout).await?;
            let connector = rama_tls_rustls::connect::build_connector().map_err(TunnelError::Tls)?;
            let mut stream = rama_tls_rustls::connect::connect(&connector, &address.host.to_string(), stream)
                .await
                .map_err(TunnelError::Tls)?;
            negotiate_connect(&mut stream, target_host, target_port, credential.as_ref()).await?;
            Box::new(stream)
        }
        ProxyEntry::Socks { address, credential } => {
            let mut stream = connect(&address.host.to_string(), address.port, connect_timeout).await?;
            let auth = credential.as_ref().map(|c| (c.username(), c.password()));
            rama_socks5::connect(&mut stream, target_host, target_port, auth)
                .await
                .map_err(TunnelError::Socks)?;
            Box::new(stream)
        }
    })
}

async fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, TunnelError> {
    tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| TunnelError::ConnectTimeout)?
        .map_err(TunnelError::Connect)
}

/// Send a `CONNECT host:port HTTP/1.1` request to an already-connected
/// upstream proxy and consume its response headers, leaving `stream`
/// positioned at the start of the tunneled byte stream.
async fn negotiate_connect<S>(
    stream: &mut S,
    target_host: &str,
    target_port: u16,
    credential: Option<&BasicCredential>,
) -> Result<(), TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request = format!("CONNECT {target_host}:{target_port} HTTP/1.1\r\nHost: {target_host}:{target_port}\r\n");
    if let Some(credential) = credential {
        let value = basic_credential_header_value(credential);
        let value = value.to_str().map_err(|_| TunnelError::UpstreamRefused("invalid credential header".to_owned()))?;
        request.push_str("Proxy-Authorization: ");
        request.push_str(value);
        request.push_str("\r\n");
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await.map_err(TunnelError::Io)?;

    let status_line = read_status_line(stream).await?;
    let status_code = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| TunnelError::UpstreamRefused(format!("malformed status line: {status_line}")))?;

    if !(200..300).contains(&status_code) {
        return Err(TunnelError::UpstreamRefused(status_line));
    }
    Ok(())
}

/// Read bytes one at a time until the blank line ending the response
/// headers, returning only the status line. Byte-at-a-time reads are
/// acceptable here: this runs once per tunnel setup, never on the data path.
async fn read_status_line<S>(stream: &mut S) -> Result<String, TunnelError>
where
    S: AsyncRead + Unpin,
{
    let mut line = Vec::new();
    let mut status_line = None;
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await.map_err(TunnelError::Io)?;
        if n == 0 {
            return Err(TunnelError::UpstreamRefused("connection closed before headers completed".to_owned()));
        }
        if byte[0] == b'\n' {
            let line_is_blank = line.is_empty() || (line.len() == 1 && line[0] == b'\r');
            if status_line.is_none() {
                status_line = Some(String::from_utf8_lossy(&line).trim_end().to_owned());
            }
            line.clear();
            if line_is_blank {
                break;
            }
        } else {
            line.push(byte[0]);
        }
    }
    status_line.ok_or_else(|| TunnelError::UpstreamRefused("empty response".to_owned()))
}

fn is_benign_disconnect(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn negotiate_connect_accepts_2xx_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]);
            assert!(request.starts_with("CONNECT target.example:443 HTTP/1.1"));
            socket.write_all(b"HTTP/1.1 200 Connection Established\r\n\r\n").await.unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        negotiate_connect(&mut client, "target.example", 443, None).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn negotiate_connect_rejects_non_2xx_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(b"HTTP/1.1 407 Proxy Authentication Required\r\n\r\n").await.unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let result = negotiate_connect(&mut client, "target.example", 443, None).await;
        assert!(matches!(result, Err(TunnelError::UpstreamRefused(_))));
        server.await.unwrap();
    }
}
