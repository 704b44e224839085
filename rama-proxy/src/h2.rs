//! Inbound HTTP/2 over cleartext (h2c) support.
//!
//! Grounded directly on the external `h2` crate's own `server`/`RecvStream`/
//! `SendStream` API (the same crate `rama-http-backend` and
//! `agent-proxy`/`agent-hbone` depend on) rather than `rama-http-core`'s
//! vendored `crate::h2` frame/hpack fragments: those only back
//! `rama-http-core`'s sealed `proto::h2::Server`, which is bound to
//! `rama_core::Service<State, Request>` via `RamaHttpService` — the older
//! two-parameter `Service` generation this workspace's new code does not
//! standardize on (`DESIGN.md`'s Service-trait-generation open question).
//! Talking to the `h2` crate directly keeps the inbound HTTP/2 path on the
//! same plain-`async fn` footing as `crate::http1`/`crate::serve`'s
//! hand-rolled HTTP/1.1 handling, for the same underlying reason.
//!
//! Only the plaintext listener path reaches this module. A MITM-terminated
//! session always negotiates `http/1.1` ALPN (`rama_tls_rustls::mitm`'s
//! acceptor pins it, since HTTP/2 is never MITM'd), so the decrypted
//! recursion back into `crate::serve::serve_loop` never needs it.

use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use h2::server::{self, SendResponse};
use h2::{RecvStream, SendStream};
use rama_http_types::dep::http_body_util::BodyExt;
use rama_http_types::{Body, Method, Request, Response, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::dispatch::DispatchError;
use crate::serve::{ServerConfig, select_entry, split_host_port};
use crate::tunnel::{self, TunnelError};

/// Failure serving one HTTP/2 (h2c) connection or stream.
#[derive(Debug)]
pub enum Http2Error {
    /// The connection preface / settings handshake failed.
    Handshake(::h2::Error),
    /// Accepting the next stream off the connection failed.
    Accept(::h2::Error),
    /// Writing response headers or data on a stream failed.
    Respond(::h2::Error),
    /// A `CONNECT` stream named no usable `host:port` target.
    BadConnectTarget(String),
    /// The localhost policy rejected this request.
    LocalhostDenied,
    /// Forwarding a plain request failed.
    Dispatch(DispatchError),
    /// Establishing or running a `CONNECT` tunnel's outbound leg failed.
    Tunnel(TunnelError),
}

impl fmt::Display for Http2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshake(e) => write!(f, "HTTP/2 connection preface failed: {e}"),
            Self::Accept(e) => write!(f, "HTTP/2 stream accept failed: {e}"),
            Self::Respond(e) => write!(f, "HTTP/2 response write failed: {e}"),
            Self::BadConnectTarget(msg) => write!(f, "bad CONNECT target: {msg}"),
            Self::LocalhostDenied => write!(f, "localhost policy denied this request"),
            Self::Dispatch(e) => write!(f, "{e}"),
            Self::Tunnel(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Http2Error {}

/// The length of the client connection preface (`PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n`).
const PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// Peek (without consuming) whether `stream` opens with the HTTP/2 client
/// connection preface, to decide whether `crate::serve::handle_connection`
/// routes here instead of the HTTP/1.x `httparse` loop.
pub(crate) async fn is_h2c_preface(stream: &TcpStream) -> std::io::Result<bool> {
    let mut buf = [0u8; PREFACE.len()];
    loop {
        let n = stream.peek(&mut buf).await?;
        if n == 0 {
            return Ok(false);
        }
        if n == buf.len() {
            return Ok(buf == *PREFACE);
        }
        stream.readable().await?;
    }
}

/// Serve an h2c connection until the peer closes it, dispatching each
/// stream concurrently.
pub(crate) async fn serve(stream: TcpStream, config: Arc<ServerConfig>) -> Result<(), Http2Error> {
    let mut connection = server::handshake(stream).await.map_err(Http2Error::Handshake)?;

    while let Some(result) = connection.accept().await {
        let (request, respond) = result.map_err(Http2Error::Accept)?;
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            if let Err(err) = handle_stream(request, respond, config).await {
                tracing::warn!(error = %err, "h2c stream ended with an error");
            }
        });
    }
    Ok(())
}

async fn handle_stream(request: Request<RecvStream>, respond: SendResponse<Bytes>, config: Arc<ServerConfig>) -> Result<(), Http2Error> {
    if request.method() == Method::CONNECT {
        handle_connect(request, respond, config).await
    } else {
        handle_request(request, respond, config).await
    }
}

/// Ordinary (non-`CONNECT`) h2c request: HTTP/2 requires `:scheme` and
/// `:authority` pseudo-headers on every request, so — unlike the HTTP/1.1
/// origin-form case `crate::serve::absolutize_request` patches up — the
/// request's `Uri` already carries an absolute form straight from `h2`.
async fn handle_request(request: Request<RecvStream>, mut respond: SendResponse<Bytes>, config: Arc<ServerConfig>) -> Result<(), Http2Error> {
    let (parts, body) = request.into_parts();
    let buffered = buffer_request_body(body).await.map_err(Http2Error::Accept)?;
    let req = Request::from_parts(parts, Body::from(buffered));

    let authority = req.uri().authority().map(|a| a.as_str().to_owned()).unwrap_or_default();
    let hostname = authority.split(':').next().unwrap_or(&authority).to_owned();
    let url = req.uri().to_string();

    let entry = select_entry(&config, &url, &hostname).await.map_err(|_| Http2Error::LocalhostDenied)?;
    let resp = config.dispatcher.dispatch(&entry, req).await.map_err(Http2Error::Dispatch)?;

    let (resp_parts, resp_body) = resp.into_parts();
    let buffered = resp_body
        .collect()
        .await
        .map_err(|_| Http2Error::BadConnectTarget("failed to buffer response body".to_owned()))?
        .to_bytes();

    let h2_response = Response::from_parts(resp_parts, ());
    let mut send = respond.send_response(h2_response, buffered.is_empty()).map_err(Http2Error::Respond)?;
    if !buffered.is_empty() {
        write_h2_data(&mut send, buffered, true).await.map_err(Http2Error::Respond)?;
    }
    Ok(())
}

/// `CONNECT` over h2: per spec, headers and status go straight to the
/// response (no raw-socket hijack as HTTP/1.1 uses), then two copiers pump
/// bytes through the h2 stream itself — client-body into the upstream
/// writer, upstream reads into a flushing writer over the response stream
/// (flushing after every non-empty write so the peer observes progress).
async fn handle_connect(request: Request<RecvStream>, mut respond: SendResponse<Bytes>, config: Arc<ServerConfig>) -> Result<(), Http2Error> {
    let authority = request
        .uri()
        .authority()
        .map(|a| a.as_str().to_owned())
        .ok_or_else(|| Http2Error::BadConnectTarget("CONNECT target has no host:port".to_owned()))?;
    let (target_host, target_port) =
        split_host_port(&authority).map_err(|_| Http2Error::BadConnectTarget(format!("invalid CONNECT target `{authority}`")))?;

    let entry = select_entry(&config, &authority, &target_host).await.map_err(|_| Http2Error::LocalhostDenied)?;
    let upstream = tunnel::dial(&entry, &target_host, target_port, config.connect_timeout).await.map_err(Http2Error::Tunnel)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .body(())
        .map_err(|_| Http2Error::BadConnectTarget("failed to build CONNECT response".to_owned()))?;
    let send = respond.send_response(response, false).map_err(Http2Error::Respond)?;

    relay_connect_tunnel(request.into_body(), send, upstream).await.map_err(Http2Error::Tunnel)
}

/// Pump bytes between an h2 `CONNECT` stream's body halves and the already
/// dialed upstream connection until either side reaches EOF.
async fn relay_connect_tunnel<T>(mut body: RecvStream, mut send: SendStream<Bytes>, upstream: T) -> Result<(), TunnelError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (mut upstream_r, mut upstream_w) = tokio::io::split(upstream);

    let client_to_upstream = async {
        while let Some(chunk) = body.data().await {
            let chunk = chunk.map_err(TunnelError::Http2)?;
            let len = chunk.len();
            upstream_w.write_all(&chunk).await.map_err(TunnelError::Io)?;
            let _ = body.flow_control().release_capacity(len);
        }
        upstream_w.shutdown().await.map_err(TunnelError::Io)
    };

    let upstream_to_client = async {
        let mut chunk = [0u8; 8 * 1024];
        loop {
            let n = upstream_r.read(&mut chunk).await.map_err(TunnelError::Io)?;
            if n == 0 {
                return write_h2_data(&mut send, Bytes::new(), true).await.map_err(TunnelError::Http2);
            }
            write_h2_data(&mut send, Bytes::copy_from_slice(&chunk[..n]), false).await.map_err(TunnelError::Http2)?;
        }
    };

    tokio::try_join!(client_to_upstream, upstream_to_client)?;
    Ok(())
}

/// Write `data` to `send`, reserving h2 flow-control capacity and waiting
/// for it to become available (the peer's receive window may lag behind
/// what we have buffered to send).
async fn write_h2_data(send: &mut SendStream<Bytes>, mut data: Bytes, end_of_stream: bool) -> Result<(), ::h2::Error> {
    loop {
        if data.is_empty() {
            if end_of_stream {
                send.send_data(Bytes::new(), true)?;
            }
            return Ok(());
        }
        send.reserve_capacity(data.len());
        let capacity = std::future::poll_fn(|cx| send.poll_capacity(cx)).await.transpose()?.unwrap_or(0);
        if capacity == 0 {
            continue;
        }
        let chunk = data.split_to(capacity.min(data.len()));
        let last = end_of_stream && data.is_empty();
        send.send_data(chunk, last)?;
    }
}

/// Buffer an h2 request body, releasing flow-control capacity as each chunk
/// is consumed (the sender's window would otherwise stall once exhausted).
async fn buffer_request_body(mut body: RecvStream) -> Result<Bytes, ::h2::Error> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        let len = chunk.len();
        buf.extend_from_slice(&chunk);
        let _ = body.flow_control().release_capacity(len);
    }
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn is_h2c_preface_detects_the_connection_preface() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            assert!(is_h2c_preface(&socket).await.unwrap());
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(PREFACE).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn is_h2c_preface_rejects_an_http11_request_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            assert!(!is_h2c_preface(&socket).await.unwrap());
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn is_h2c_preface_returns_false_on_immediate_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            assert!(!is_h2c_preface(&socket).await.unwrap());
        });

        let client = TcpStream::connect(addr).await.unwrap();
        drop(client);
        server.await.unwrap();
    }
}
