//! Inbound connection handling: read requests off a client connection,
//! decide `CONNECT`-tunnel vs. plain-request handling, and either splice a
//! tunnel (optionally through [`MitmEngine`]) or forward the request through
//! [`Dispatcher`] and write its response back.
//!
//! Mirrors `crate::http1`'s client-side roundtrip but for the server side:
//! `rama-http-core` does ship a real `server::conn::http1` implementation,
//! but it is bound to `rama_core::Service<State, Request>` via
//! `RamaHttpService`, the older two-parameter `Service` generation this
//! workspace's new code does not standardize on (see `DESIGN.md`'s
//! Service-trait-generation open question). Parsing requests directly with
//! `httparse` keeps the inbound path on the same plain-`async fn` footing as
//! the rest of `rama-proxy`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use rama_http::io::upgrade::Upgraded;
use rama_http_types::dep::http_body_util::BodyExt;
use rama_http_types::{Body, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, Uri, Version, header};
use rama_net::address::Host;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::dispatch::{DispatchError, Dispatcher};
use crate::entry::ProxyEntry;
use crate::h2::{self, Http2Error};
use crate::http1::ChunkedReader;
use crate::mitm::{MitmEngine, MitmError};
use crate::select::{LocalhostDenied, ProxySelector};
use crate::tunnel::{self, TunnelError};

/// Failure serving one client connection.
#[derive(Debug)]
pub enum ServeError {
    /// Reading or writing on the client connection failed.
    Io(std::io::Error),
    /// The client's request line/headers were malformed.
    Malformed(&'static str),
    /// A `CONNECT` request named no usable `host:port` target.
    BadConnectTarget(String),
    /// The localhost policy rejected this request.
    LocalhostDenied,
    /// Forwarding a plain request failed.
    Dispatch(DispatchError),
    /// Establishing or running a tunnel failed.
    Tunnel(TunnelError),
    /// MITM TLS termination failed.
    Mitm(MitmError),
    /// Serving an HTTP/2 (h2c) connection failed.
    Http2(Http2Error),
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "client connection I/O error: {e}"),
            Self::Malformed(msg) => write!(f, "malformed client request: {msg}"),
            Self::BadConnectTarget(msg) => write!(f, "bad CONNECT target: {msg}"),
            Self::LocalhostDenied => write!(f, "{}", LocalhostDenied),
            Self::Dispatch(e) => write!(f, "{e}"),
            Self::Tunnel(e) => write!(f, "{e}"),
            Self::Mitm(e) => write!(f, "{e}"),
            Self::Http2(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ServeError {}

/// Shared, per-listener configuration handed to every accepted connection.
pub struct ServerConfig {
    pub selector: ProxySelector,
    pub dispatcher: Dispatcher,
    pub mitm: Option<MitmEngine>,
    pub connect_timeout: Duration,
    /// Time allowed to receive a client's first request head on a freshly
    /// accepted (or freshly MITM-terminated) connection. `Duration::ZERO`
    /// disables the timeout.
    pub read_header_timeout: Duration,
    /// Time a keep-alive connection may sit idle waiting for its next
    /// request before it is closed. `Duration::ZERO` disables the timeout.
    pub idle_timeout: Duration,
}

/// Serve one freshly-accepted client `TcpStream` until it (or the proxy)
/// closes the connection.
///
/// A client that opens with the HTTP/2 connection preface (cleartext h2c;
/// §6 lists h2c alongside HTTP/1.0/1.1) is routed to `crate::h2` instead of
/// the `httparse`-based loop below. A MITM-terminated session never takes
/// this branch: `rama_tls_rustls::mitm`'s acceptor pins ALPN to `http/1.1`,
/// so the decrypted recursion back into `serve_loop` is always HTTP/1.x.
pub async fn handle_connection(stream: TcpStream, config: Arc<ServerConfig>) -> Result<(), ServeError> {
    if h2::is_h2c_preface(&stream).await.map_err(ServeError::Io)? {
        return h2::serve(stream, config).await.map_err(ServeError::Http2);
    }
    serve_loop(stream, config, false).await
}

/// Read and forward requests off `stream` in a loop (HTTP/1.1 keep-alive),
/// until a `CONNECT` hijacks the connection, the client disconnects, or a
/// non-keep-alive response is sent.
///
/// `secure` is this connection's session flag (spec §3): `false` for a freshly
/// accepted client socket, `true` when this call is the MITM-recursion after
/// `handle_connect` has decrypted a `CONNECT`ed TLS stream. It decides the
/// scheme `forward_request` reconstructs for origin-form requests.
///
/// Boxed because a `CONNECT` can recurse back into this same function after
/// a MITM TLS accept (`serve_loop::<TlsStream<Upgraded>>` calling itself via
/// `handle_connect` on a nested `CONNECT`), which an ordinary `async fn`
/// cannot express — the compiler needs a fixed-size future.
fn serve_loop<S>(
    mut stream: S,
    config: Arc<ServerConfig>,
    secure: bool,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ServeError>> + Send>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    Box::pin(async move {
        let mut buf = BytesMut::with_capacity(8 * 1024);
        let mut first = true;
        loop {
            let timeout = if first { config.read_header_timeout } else { config.idle_timeout };
            let parsed = match read_with_timeout(&mut stream, &mut buf, timeout).await {
                Ok(Some(parsed)) => parsed,
                Ok(None) => return Ok(()),
                Err(ServeError::Io(e)) if !first && e.kind() == std::io::ErrorKind::TimedOut => return Ok(()),
                Err(e) => return Err(e),
            };
            first = false;

            if parsed.head.method == Method::CONNECT {
                // Anything already read past the CONNECT head (e.g. a client
                // that pipelines its ClientHello without waiting for the 200)
                // sits in `buf` — it belongs to the tunnel, not to us.
                let buffered = buf.split().freeze();
                return handle_connect(stream, parsed, config, buffered, secure).await;
            }

            let keep_alive = request_wants_keep_alive(&parsed.head);
            let req = into_request(parsed)?;
            let resp = forward_request(&config, secure, req).await?;
            write_response(&mut stream, resp).await?;

            if !keep_alive {
                return Ok(());
            }
        }
    })
}

fn handle_connect<S>(
    mut stream: S,
    parsed: ParsedRequest,
    config: Arc<ServerConfig>,
    buffered: Bytes,
    secure: bool,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ServeError>> + Send>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    Box::pin(async move {
        let authority = parsed
            .head
            .uri
            .authority()
            .map(|a| a.as_str().to_owned())
            .ok_or_else(|| ServeError::BadConnectTarget("CONNECT target has no host:port".to_owned()))?;
        let (target_host, target_port) = split_host_port(&authority)?;

        let entry = select_entry(&config, &authority, &target_host).await?;

        stream
            .write_all(b"HTTP/1.1 200 Connection Established\r\n\r\n")
            .await
            .map_err(ServeError::Io)?;

        let client = Upgraded::new(stream, buffered);

        match &config.mitm {
            Some(mitm) => {
                let tls = mitm.terminate(client).await.map_err(ServeError::Mitm)?;
                // The decrypted requests re-entering serve_loop are now on a
                // secure session (spec §4.3) regardless of how this
                // connection itself arrived.
                serve_loop(tls, config, true).await
            }
            None => tunnel::run(&entry, &target_host, target_port, config.connect_timeout, client)
                .await
                .map_err(ServeError::Tunnel),
        }
    })
}

async fn forward_request(config: &ServerConfig, secure: bool, mut req: Request<Body>) -> Result<Response<Body>, ServeError> {
    let authority = req
        .uri()
        .authority()
        .map(|a| a.as_str().to_owned())
        .or_else(|| req.headers().get(header::HOST).and_then(|v| v.to_str().ok()).map(ToOwned::to_owned))
        .unwrap_or_default();
    let hostname = authority.split(':').next().unwrap_or(&authority).to_owned();
    let url = req.uri().to_string();

    let entry = select_entry(config, &url, &hostname).await?;

    // A request decrypted by MITM (or any origin-form request) carries no
    // absolute URI — `req.uri().authority()` is `None` — so the dispatcher's
    // `request_target` would otherwise fail every such request. Reconstruct
    // one from the session's secure flag and the Host header (spec §4.1
    // step 2) before handing it off.
    if req.uri().authority().is_none() {
        absolutize_request(&mut req, secure, &authority)?;
    }

    config.dispatcher.dispatch(&entry, req).await.map_err(ServeError::Dispatch)
}

/// Rebuild `req`'s URI as `scheme://authority<path-and-query>` in place.
/// `scheme` follows the session's secure flag per spec §4.1 step 2
/// ("If the URL scheme is empty, set http or https depending on whether the
/// inbound session is secure").
fn absolutize_request(req: &mut Request<Body>, secure: bool, authority: &str) -> Result<(), ServeError> {
    if authority.is_empty() {
        return Err(ServeError::Malformed("request has no authority and no Host header"));
    }
    let scheme = if secure { "https" } else { "http" };
    let path_and_query = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let absolute: Uri = format!("{scheme}://{authority}{path_and_query}")
        .parse()
        .map_err(|_| ServeError::Malformed("failed to reconstruct absolute request URI"))?;
    *req.uri_mut() = absolute;
    Ok(())
}

pub(crate) async fn select_entry(config: &ServerConfig, url: &str, hostname: &str) -> Result<ProxyEntry, ServeError> {
    let is_loopback = Host::from_str(hostname).ok().is_some_and(|host| is_loopback_host(&host));
    config.selector.select(url, hostname, is_loopback).await.map_err(|_| ServeError::LocalhostDenied)
}

fn is_loopback_host(host: &Host) -> bool {
    match host {
        Host::Address(ip) => ip.is_loopback(),
        Host::Name(domain) => domain.as_str().eq_ignore_ascii_case("localhost"),
    }
}

pub(crate) fn split_host_port(authority: &str) -> Result<(String, u16), ServeError> {
    let (host, port) = authority
        .rsplit_once(':')
        .ok_or_else(|| ServeError::BadConnectTarget(format!("missing port in `{authority}`")))?;
    let port: u16 = port
        .parse()
        .map_err(|_| ServeError::BadConnectTarget(format!("invalid port in `{authority}`")))?;
    Ok((host.trim_start_matches('[').trim_end_matches(']').to_owned(), port))
}

fn request_wants_keep_alive(head: &RequestHead) -> bool {
    match head.headers.get(header::CONNECTION).and_then(|v| v.to_str().ok()) {
        Some(v) if v.eq_ignore_ascii_case("close") => false,
        Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
        _ => head.version == Version::HTTP_11,
    }
}

struct RequestHead {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
}

struct ParsedRequest {
    head: RequestHead,
    body: Bytes,
}

fn into_request(parsed: ParsedRequest) -> Result<Request<Body>, ServeError> {
    let mut builder = Request::builder().method(parsed.head.method).uri(parsed.head.uri).version(parsed.head.version);
    *builder.headers_mut().ok_or(ServeError::Malformed("request builder has no headers"))? = parsed.head.headers;
    builder.body(Body::from(parsed.body)).map_err(|_| ServeError::Malformed("failed to assemble request"))
}

/// Run [`read_request`] under an optional deadline. `Duration::ZERO` means
/// no deadline; a deadline that elapses is reported as an [`ServeError::Io`]
/// carrying [`std::io::ErrorKind::TimedOut`], which the caller in
/// `serve_loop` treats as a clean close when waiting on a keep-alive
/// connection and as a hard error while a request head is still in flight.
async fn read_with_timeout<S>(stream: &mut S, buf: &mut BytesMut, timeout: Duration) -> Result<Option<ParsedRequest>, ServeError>
where
    S: AsyncRead + Unpin,
{
    if timeout.is_zero() {
        return read_request(stream, buf).await;
    }
    match tokio::time::timeout(timeout, read_request(stream, buf)).await {
        Ok(result) => result,
        Err(_) => Err(ServeError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out reading request"))),
    }
}

/// Read one request's head and body off `stream`, reusing any bytes already
/// buffered from a previous keep-alive iteration. Returns `None` on a clean
/// EOF before any bytes of a new request arrive.
async fn read_request<S>(stream: &mut S, buf: &mut BytesMut) -> Result<Option<ParsedRequest>, ServeError>
where
    S: AsyncRead + Unpin,
{
    let (method, uri, version, headers, head_len) = loop {
        let mut headers_buf = [httparse::EMPTY_HEADER; 64];
        let mut parsed = httparse::Request::new(&mut headers_buf);
        match parsed.parse(buf).map_err(|_| ServeError::Malformed("invalid request line or headers"))? {
            httparse::Status::Complete(head_len) => {
                let method = parsed.method.ok_or(ServeError::Malformed("missing method"))?;
                let method = Method::from_bytes(method.as_bytes()).map_err(|_| ServeError::Malformed("invalid method"))?;
                let raw_path = parsed.path.ok_or(ServeError::Malformed("missing request target"))?;
                let uri: Uri = if method == Method::CONNECT {
                    format!("//{raw_path}").parse().map_err(|_| ServeError::Malformed("invalid CONNECT target"))?
                } else {
                    raw_path.parse().map_err(|_| ServeError::Malformed("invalid request target"))?
                };
                let version = if parsed.version == Some(1) { Version::HTTP_11 } else { Version::HTTP_10 };
                let mut map = HeaderMap::with_capacity(parsed.headers.len());
                for h in parsed.headers.iter() {
                    let name = HeaderName::from_bytes(h.name.as_bytes()).map_err(|_| ServeError::Malformed("invalid header name"))?;
                    let value = HeaderValue::from_bytes(h.value).map_err(|_| ServeError::Malformed("invalid header value"))?;
                    map.append(name, value);
                }
                break (method, uri, version, map, head_len);
            }
            httparse::Status::Partial => {
                let mut chunk = [0u8; 4096];
                let n = stream.read(&mut chunk).await.map_err(ServeError::Io)?;
                if n == 0 {
                    if buf.is_empty() {
                        return Ok(None);
                    }
                    return Err(ServeError::Malformed("connection closed mid-request"));
                }
                buf.extend_from_slice(&chunk[..n]);
            }
        }
    };

    let leftover = buf.split_off(head_len);
    buf.clear();
    let body = read_request_body(stream, &headers, leftover, buf).await?;

    Ok(Some(ParsedRequest {
        head: RequestHead { method, uri, version, headers },
        body,
    }))
}

/// Buffer the request body per its declared framing, leaving `buf` holding
/// whatever trailed past the body (the start of the next keep-alive
/// request, if any).
async fn read_request_body<S>(stream: &mut S, headers: &HeaderMap, mut leftover: BytesMut, buf: &mut BytesMut) -> Result<Bytes, ServeError>
where
    S: AsyncRead + Unpin,
{
    let is_chunked = headers
        .get(header::TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));

    if is_chunked {
        let cursor = std::io::Cursor::new(leftover.freeze());
        let mut decoder = ChunkedReader::new(cursor.chain(stream));
        let mut body = Vec::new();
        decoder.read_to_end(&mut body).await.map_err(ServeError::Io)?;
        return Ok(Bytes::from(body));
    }

    let declared_len = match headers.get(header::CONTENT_LENGTH).and_then(|v| v.to_str().ok()).map(str::parse::<u64>) {
        Some(Ok(len)) => len,
        Some(Err(_)) => return Err(ServeError::Malformed("invalid Content-Length")),
        None => 0,
    };

    while (leftover.len() as u64) < declared_len {
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.map_err(ServeError::Io)?;
        if n == 0 {
            return Err(ServeError::Malformed("connection closed before request body completed"));
        }
        leftover.extend_from_slice(&chunk[..n]);
    }

    let body = leftover.split_to(declared_len as usize).freeze();
    buf.unsplit(leftover);
    Ok(body)
}

/// Write `resp` to `stream` as a `Content-Length`-framed HTTP/1.1 response
/// (the response body is fully buffered first: dispatcher responses are not
/// expected to be unbounded, and buffering keeps this writer as simple as
/// the hand-rolled request reader it pairs with).
async fn write_response<S>(stream: &mut S, resp: Response<Body>) -> Result<(), ServeError>
where
    S: AsyncWrite + Unpin,
{
    let (parts, body) = resp.into_parts();
    let buffered = body.collect().await.map_err(|_| ServeError::Malformed("failed to buffer response body"))?.to_bytes();

    let mut head = BytesMut::new();
    let reason = parts.status.canonical_reason().unwrap_or("");
    head.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", parts.status.as_u16(), reason).as_bytes());
    for (name, value) in &parts.headers {
        if name == header::CONTENT_LENGTH {
            continue;
        }
        head.extend_from_slice(name.as_str().as_bytes());
        head.extend_from_slice(b": ");
        head.extend_from_slice(value.as_bytes());
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(format!("content-length: {}\r\n\r\n", buffered.len()).as_bytes());

    stream.write_all(&head).await.map_err(ServeError::Io)?;
    if !buffered.is_empty() {
        stream.write_all(&buffered).await.map_err(ServeError::Io)?;
    }
    stream.flush().await.map_err(ServeError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_request_parses_method_uri_and_headers() {
        let mut buf = BytesMut::new();
        let raw = b"GET http://example.com/path HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut cursor = std::io::Cursor::new(&raw[..]);
        let parsed = read_request(&mut cursor, &mut buf).await.unwrap().unwrap();
        assert_eq!(parsed.head.method, Method::GET);
        assert_eq!(parsed.head.uri.path(), "/path");
        assert_eq!(parsed.head.headers.get(header::HOST).unwrap(), "example.com");
        assert!(parsed.body.is_empty());
    }

    #[tokio::test]
    async fn read_request_buffers_content_length_body() {
        let mut buf = BytesMut::new();
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let mut cursor = std::io::Cursor::new(&raw[..]);
        let parsed = read_request(&mut cursor, &mut buf).await.unwrap().unwrap();
        assert_eq!(&parsed.body[..], b"hello");
    }

    #[tokio::test]
    async fn read_request_returns_none_on_clean_eof() {
        let mut buf = BytesMut::new();
        let raw: &[u8] = b"";
        let mut cursor = std::io::Cursor::new(raw);
        let parsed = read_request(&mut cursor, &mut buf).await.unwrap();
        assert!(parsed.is_none());
    }

    #[tokio::test]
    async fn connect_request_parses_as_authority_target() {
        let mut buf = BytesMut::new();
        let raw = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n";
        let mut cursor = std::io::Cursor::new(&raw[..]);
        let parsed = read_request(&mut cursor, &mut buf).await.unwrap().unwrap();
        assert_eq!(parsed.head.method, Method::CONNECT);
        assert_eq!(parsed.head.uri.authority().unwrap().as_str(), "example.com:443");
    }

    #[test]
    fn split_host_port_rejects_missing_port() {
        assert!(split_host_port("example.com").is_err());
    }

    #[test]
    fn split_host_port_strips_ipv6_brackets() {
        let (host, port) = split_host_port("[::1]:8080").unwrap();
        assert_eq!(host, "::1");
        assert_eq!(port, 8080);
    }

    #[test]
    fn keep_alive_defaults_to_true_on_http11() {
        let head = RequestHead {
            method: Method::GET,
            uri: "/".parse().unwrap(),
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
        };
        assert!(request_wants_keep_alive(&head));
    }

    #[tokio::test]
    async fn read_with_timeout_zero_means_no_deadline() {
        let mut buf = BytesMut::new();
        let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut cursor = std::io::Cursor::new(&raw[..]);
        let parsed = read_with_timeout(&mut cursor, &mut buf, Duration::ZERO).await.unwrap();
        assert!(parsed.is_some());
    }

    #[tokio::test]
    async fn read_with_timeout_elapses_on_a_stream_with_no_data() {
        let (_client, mut server) = tokio::io::duplex(64);
        let mut buf = BytesMut::new();
        let result = read_with_timeout(&mut server, &mut buf, Duration::from_millis(10)).await;
        match result {
            Err(ServeError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::TimedOut),
            other => panic!("expected a timeout error, got {other:?}"),
        }
    }

    #[test]
    fn absolutize_request_uses_secure_flag_for_scheme() {
        let mut req = Request::builder().method(Method::GET).uri("/path").body(Body::empty()).unwrap();
        absolutize_request(&mut req, true, "example.com:443").unwrap();
        assert_eq!(req.uri().to_string(), "https://example.com:443/path");
    }

    #[test]
    fn absolutize_request_defaults_to_http_when_not_secure() {
        let mut req = Request::builder().method(Method::GET).uri("/path").body(Body::empty()).unwrap();
        absolutize_request(&mut req, false, "example.com:80").unwrap();
        assert_eq!(req.uri().to_string(), "http://example.com:80/path");
    }

    #[test]
    fn absolutize_request_rejects_missing_authority() {
        let mut req = Request::builder().method(Method::GET).uri("/path").body(Body::empty()).unwrap();
        assert!(absolutize_request(&mut req, false, "").is_err());
    }

    #[test]
    fn keep_alive_false_when_connection_close() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        let head = RequestHead {
            method: Method::GET,
            uri: "/".parse().unwrap(),
            version: Version::HTTP_11,
            headers,
        };
        assert!(!request_wants_keep_alive(&head));
    }
}
