//! Minimal HTTP/1.1 client roundtrip for the outbound leg of the dispatcher.
//! [`ChunkedReader`] is also reused by `crate::serve` to decode inbound
//! chunked request bodies — the RFC 7230 §4.1 grammar is the same in both
//! directions.
//!
//! `rama-http-core` declares a `client::conn::http1` module (see
//! `client/conn/mod.rs`) but ships no corresponding source file — only the
//! server-side `server::conn::http1` and the client-side `client::conn::http2`
//! are present. Rather than depend on a module that doesn't exist in this
//! tree, this is a small, explicit HTTP/1.1 client built directly on
//! `httparse` (the same wire-parsing crate `rama-http-core` itself uses
//! internally) and RFC 7230 §3.3.3's message-length rules.
//!
//! The request body is fully buffered before sending (its exact length is
//! needed to frame it, and the original `Transfer-Encoding` was already
//! stripped as hop-by-hop per spec §4.1); the response body is streamed back
//! to satisfy the dispatcher's requirement to forward SSE/chunked responses
//! without buffering them.

use bytes::{Bytes, BytesMut};
use rama_http_types::dep::http_body_util::BodyExt;
use rama_http_types::{Body, HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode, Version, header};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;

/// Failure performing the HTTP/1.1 roundtrip itself (as opposed to
/// connecting to the peer, which is [`crate::dispatch::DispatchError`]'s
/// concern).
#[derive(Debug)]
pub enum Http1Error {
    /// Writing the request to the peer failed.
    Write(std::io::Error),
    /// Reading or parsing the response failed.
    Read(std::io::Error),
    /// The peer's status line / headers were malformed.
    Malformed(&'static str),
    /// The peer's declared `Content-Length` was not a valid integer.
    InvalidContentLength,
}

impl fmt::Display for Http1Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(e) => write!(f, "failed to write request: {e}"),
            Self::Read(e) => write!(f, "failed to read response: {e}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
            Self::InvalidContentLength => write!(f, "invalid Content-Length header"),
        }
    }
}

impl std::error::Error for Http1Error {}

/// Send `req` over `stream` and return the peer's response, with its body
/// streaming rather than pre-buffered.
///
/// `stream` is consumed: the response body returned here keeps reading from
/// it after this function returns (for streamed SSE/chunked responses), so
/// it cannot be a borrow bounded by this call's lifetime.
pub async fn roundtrip<S>(mut stream: S, req: Request<Body>) -> Result<Response<Body>, Http1Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();
    let buffered = body.collect().await.map_err(|_| Http1Error::Malformed("failed to buffer request body"))?.to_bytes();

    let mut head = BytesMut::new();
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());
    head.extend_from_slice(format!("{} {} HTTP/1.1\r\n", parts.method, path).as_bytes());
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

    stream.write_all(&head).await.map_err(Http1Error::Write)?;
    if !buffered.is_empty() {
        stream.write_all(&buffered).await.map_err(Http1Error::Write)?;
    }
    stream.flush().await.map_err(Http1Error::Write)?;

    read_response(stream).await
}

/// Read and parse a status line + headers, then build a `Response` whose
/// body streams the remaining bytes per the headers' framing.
async fn read_response<S>(mut stream: S) -> Result<Response<Body>, Http1Error>
where
    S: AsyncRead + Unpin + Send + Sync + 'static,
{
    let mut buf = BytesMut::with_capacity(8 * 1024);
    let (status, version, headers, head_len) = loop {
        let mut headers_buf = [httparse::EMPTY_HEADER; 64];
        let mut parsed = httparse::Response::new(&mut headers_buf);
        match parsed.parse(&buf).map_err(|_| Http1Error::Malformed("invalid status line or headers"))? {
            httparse::Status::Complete(head_len) => {
                let status = StatusCode::from_u16(parsed.code.ok_or(Http1Error::Malformed("missing status code"))?)
                    .map_err(|_| Http1Error::Malformed("invalid status code"))?;
                let version = if parsed.version == Some(1) { Version::HTTP_11 } else { Version::HTTP_10 };
                let mut map = HeaderMap::with_capacity(parsed.headers.len());
                for h in parsed.headers.iter() {
                    let name = HeaderName::from_bytes(h.name.as_bytes()).map_err(|_| Http1Error::Malformed("invalid header name"))?;
                    let value = HeaderValue::from_bytes(h.value).map_err(|_| Http1Error::Malformed("invalid header value"))?;
                    map.append(name, value);
                }
                break (status, version, map, head_len);
            }
            httparse::Status::Partial => {
                let mut chunk = [0u8; 4096];
                let n = stream.read(&mut chunk).await.map_err(Http1Error::Read)?;
                if n == 0 {
                    return Err(Http1Error::Malformed("connection closed before headers completed"));
                }
                buf.extend_from_slice(&chunk[..n]);
            }
        }
    };

    let leftover = Bytes::copy_from_slice(&buf[head_len..]);
    let body = response_body(stream, &headers, leftover);

    let mut builder = Response::builder().status(status).version(version);
    *builder.headers_mut().ok_or(Http1Error::Malformed("response builder has no headers"))? = headers;
    builder.body(body).map_err(|_| Http1Error::Malformed("failed to assemble response"))
}

/// Decide the response body's framing per RFC 7230 §3.3.3 and wrap the rest
/// of `stream` (prefixed by whatever was already buffered while parsing
/// headers) as a streaming [`Body`].
fn response_body<S>(stream: S, headers: &HeaderMap, leftover: Bytes) -> Body
where
    S: AsyncRead + Unpin + Send + Sync + 'static,
{
    let is_chunked = headers
        .get(header::TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));

    let leftover = std::io::Cursor::new(leftover);

    if is_chunked {
        return Body::from_stream(ReaderStream::new(ChunkedReader::new(leftover.chain(stream))));
    }

    match headers.get(header::CONTENT_LENGTH).and_then(|v| v.to_str().ok()).map(str::parse::<u64>) {
        Some(Ok(len)) => {
            let leftover_len = leftover.get_ref().len() as u64;
            let remaining = len.saturating_sub(leftover_len);
            Body::from_stream(ReaderStream::new(leftover.chain(stream.take(remaining))))
        }
        Some(Err(_)) => Body::from_stream(futures_util::stream::once(async { Err::<Bytes, std::io::Error>(std::io::Error::other("invalid Content-Length")) })),
        None => Body::from_stream(ReaderStream::new(leftover.chain(stream))),
    }
}

/// Which part of the `chunk-size CRLF chunk-data CRLF` grammar a
/// [`ChunkedReader`] is currently positioned at.
pub(crate) enum ChunkedState {
    /// Reading a `chunk-size [ ";" chunk-ext ] CRLF` line.
    Size,
    /// Copying out the `remaining` data bytes of the current chunk.
    Data(u64),
    /// Consuming the CRLF that follows a chunk's data, before the next
    /// chunk-size line.
    TrailingCrlf,
    /// The zero-size chunk was seen; any trailers are discarded unread.
    Done,
}

/// Decodes an RFC 7230 §4.1 chunked body into raw bytes, stopping at the
/// terminating zero-length chunk (trailers, if any, are discarded).
///
/// Line buffering (`line_buf`) and the current grammar position (`state`)
/// live on `self` rather than in a local variable, so that a line split
/// across multiple TCP reads survives a `Poll::Pending` return.
pub(crate) struct ChunkedReader<S> {
    inner: S,
    state: ChunkedState,
    line_buf: Vec<u8>,
}

impl<S> ChunkedReader<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self { inner, state: ChunkedState::Size, line_buf: Vec::new() }
    }
}

impl<S: AsyncRead + Unpin> ChunkedReader<S> {
    /// Read into `line_buf` one byte at a time until it ends with `\n`.
    fn poll_fill_line(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<std::io::Result<()>> {
        use std::task::Poll;

        loop {
            if self.line_buf.last() == Some(&b'\n') {
                return Poll::Ready(Ok(()));
            }
            let mut byte = [0u8; 1];
            let mut rb = tokio::io::ReadBuf::new(&mut byte);
            match std::pin::Pin::new(&mut self.inner).poll_read(cx, &mut rb) {
                Poll::Ready(Ok(())) => {
                    if rb.filled().is_empty() {
                        return Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "chunked body truncated")));
                    }
                    self.line_buf.push(rb.filled()[0]);
                }
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ChunkedReader<S> {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        use std::task::Poll;

        loop {
            match self.state {
                ChunkedState::Done => return Poll::Ready(Ok(())),
                ChunkedState::TrailingCrlf => match self.poll_fill_line(cx) {
                    Poll::Ready(Ok(())) => {
                        self.line_buf.clear();
                        self.state = ChunkedState::Size;
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                },
                ChunkedState::Size => match self.poll_fill_line(cx) {
                    Poll::Ready(Ok(())) => {
                        let line = self.line_buf.trim_ascii_end();
                        let text = String::from_utf8_lossy(line);
                        let size_str = text.split(';').next().unwrap_or("").trim();
                        let size = match u64::from_str_radix(size_str, 16) {
                            Ok(size) => size,
                            Err(_) => return Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid chunk size"))),
                        };
                        self.line_buf.clear();
                        self.state = if size == 0 { ChunkedState::Done } else { ChunkedState::Data(size) };
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                },
                ChunkedState::Data(remaining) => {
                    let take = buf.remaining().min(remaining as usize);
                    if take == 0 {
                        return Poll::Ready(Ok(()));
                    }
                    let mut limited = buf.take(take);
                    let before = limited.filled().len();
                    return match std::pin::Pin::new(&mut self.inner).poll_read(cx, &mut limited) {
                        Poll::Ready(Ok(())) => {
                            let read = limited.filled().len() - before;
                            buf.advance(read);
                            let remaining_after = remaining - read as u64;
                            self.state = if remaining_after == 0 { ChunkedState::TrailingCrlf } else { ChunkedState::Data(remaining_after) };
                            Poll::Ready(Ok(()))
                        }
                        other => other,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn roundtrip_sends_request_and_parses_content_length_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]);
            assert!(request.starts_with("GET /path HTTP/1.1"));
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello")
                .await
                .unwrap();
        });

        let client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let req = Request::builder().method("GET").uri("http://example.com/path").body(Body::empty()).unwrap();
        let resp = roundtrip(client, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn roundtrip_decodes_chunked_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n4\r\nwiki\r\n5\r\npedia\r\n0\r\n\r\n")
                .await
                .unwrap();
        });

        let client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let req = Request::builder().method("GET").uri("http://example.com/path").body(Body::empty()).unwrap();
        let resp = roundtrip(client, req).await.unwrap();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"wikipedia");
        server.await.unwrap();
    }
}
