//! External file/URL loader.
//!
//! Resolves `file:…`, `http(s):…`, `data:[mime;]base64,…`, bare filesystem
//! paths, and `-` (stdin) into a byte stream. Used to fetch PAC scripts, CA
//! certificates, CA keys, and custom CA bundles.
//!
//! `http(s):` sources need an async HTTP client, which this crate
//! deliberately does not depend on (it sits underneath `rama-core` in the
//! dependency graph and every surviving crate depends on it). Callers that
//! need `http(s):` support pass a [`Fetcher`] implementation; callers that
//! only ever see local sources can use [`load`] directly and get
//! [`LoadError::HttpUnsupported`] if an `http(s):` source shows up.

use base64::Engine as _;
use std::fmt;
use std::path::PathBuf;

/// A parsed, not-yet-resolved loader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read from standard input (`-`).
    Stdin,
    /// Read from a filesystem path (from a bare path or a `file:` URL).
    File(PathBuf),
    /// Fetch over HTTP(S); the string is the full URL.
    Http(String),
    /// Inline `data:` URI payload, already decoded.
    Data(Vec<u8>),
}

/// Error resolving or reading a loader [`Source`].
#[derive(Debug)]
pub enum LoadError {
    /// The source string couldn't be classified into any known form.
    InvalidSource(String),
    /// A malformed `data:` URI (missing comma, bad base64, …).
    InvalidDataUrl(String),
    /// An `http(s):` source was given to [`load`], which has no HTTP client.
    HttpUnsupported(String),
    /// Filesystem or stdin I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSource(s) => write!(f, "invalid loader source: {s}"),
            Self::InvalidDataUrl(s) => write!(f, "invalid data: url: {s}"),
            Self::HttpUnsupported(s) => write!(
                f,
                "http(s) source requires a Fetcher, none given: {s}"
            ),
            Self::Io(e) => write!(f, "loader io error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Classify `spec` into a [`Source`] without doing any I/O.
pub fn parse_source(spec: &str) -> Result<Source, LoadError> {
    if spec == "-" {
        return Ok(Source::Stdin);
    }
    if let Some(rest) = spec.strip_prefix("data:") {
        return parse_data_url(rest).map(Source::Data);
    }
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return Ok(Source::Http(spec.to_owned()));
    }
    if spec.starts_with("file:") {
        return parse_file_url(spec).map(Source::File);
    }
    // bare path, including Windows UNC (`\\host\share\...`) and drive-letter
    // (`c:\...`) forms, which are passed through untouched.
    Ok(Source::File(PathBuf::from(spec)))
}

/// Resolve `spec` into bytes. Handles every [`Source`] except
/// [`Source::Http`] — for that, use [`load_with_fetcher`].
#[cfg(feature = "std")]
pub async fn load(spec: &str) -> Result<Vec<u8>, LoadError> {
    match parse_source(spec)? {
        Source::Stdin => read_stdin().await,
        Source::File(path) => Ok(tokio::fs::read(path).await?),
        Source::Data(bytes) => Ok(bytes),
        Source::Http(url) => Err(LoadError::HttpUnsupported(url)),
    }
}

/// Resolve `spec` into bytes, delegating `http(s):` sources to `fetcher`.
#[cfg(feature = "std")]
pub async fn load_with_fetcher<F>(spec: &str, fetcher: &F) -> Result<Vec<u8>, LoadError>
where
    F: Fetcher,
{
    match parse_source(spec)? {
        Source::Stdin => read_stdin().await,
        Source::File(path) => Ok(tokio::fs::read(path).await?),
        Source::Data(bytes) => Ok(bytes),
        Source::Http(url) => fetcher
            .fetch(&url)
            .await
            .map_err(|e| LoadError::Io(std::io::Error::other(e))),
    }
}

#[cfg(feature = "std")]
async fn read_stdin() -> Result<Vec<u8>, LoadError> {
    use tokio::io::AsyncReadExt as _;
    let mut buf = Vec::new();
    tokio::io::stdin().read_to_end(&mut buf).await?;
    Ok(buf)
}

/// An async fetcher for `http(s):` loader sources, implemented by the caller
/// so this crate need not depend on an HTTP client stack.
pub trait Fetcher {
    /// The error type surfaced by a failed fetch.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch `url` and return its response body.
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send + '_;
}

fn parse_data_url(rest: &str) -> Result<Vec<u8>, LoadError> {
    let comma = rest
        .find(',')
        .ok_or_else(|| LoadError::InvalidDataUrl(rest.to_owned()))?;
    let meta = &rest[..comma];
    let payload = &rest[comma + 1..];
    let is_base64 = meta.split(';').any(|p| p.eq_ignore_ascii_case("base64"));
    if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.as_bytes())
            .map_err(|_| LoadError::InvalidDataUrl(rest.to_owned()))
    } else {
        Ok(percent_encoding::percent_decode_str(payload).collect())
    }
}

fn parse_file_url(spec: &str) -> Result<PathBuf, LoadError> {
    let rest = spec
        .strip_prefix("file:")
        .ok_or_else(|| LoadError::InvalidSource(spec.to_owned()))?;

    if let Some(path) = parse_drive_letter(rest) {
        return Ok(PathBuf::from(path));
    }

    if let Some(authority_and_path) = rest.strip_prefix("//") {
        let (authority, path) = match authority_and_path.find('/') {
            Some(idx) => (
                &authority_and_path[..idx],
                &authority_and_path[idx..],
            ),
            None => (authority_and_path, ""),
        };
        let decoded_path: String = percent_encoding::percent_decode_str(path)
            .decode_utf8_lossy()
            .into_owned();

        if authority.is_empty() || authority.eq_ignore_ascii_case("localhost") {
            let trimmed = decoded_path.trim_start_matches('/');
            if let Some(drive_path) = parse_drive_letter(trimmed) {
                return Ok(PathBuf::from(drive_path));
            }
            return Ok(PathBuf::from(decoded_path));
        }

        // file://host/share/path -> UNC \\host\share\path
        let unc = format!("\\\\{authority}{}", decoded_path.replace('/', "\\"));
        return Ok(PathBuf::from(unc));
    }

    if let Some(path) = rest.strip_prefix('/') {
        let decoded: String = percent_encoding::percent_decode_str(path)
            .decode_utf8_lossy()
            .into_owned();
        return Ok(PathBuf::from(format!("/{decoded}")));
    }

    Err(LoadError::InvalidSource(spec.to_owned()))
}

/// Recognize `c:...` or `c|...` drive-letter prefixes (RFC 8089 §E.2),
/// normalizing `|` to `:`.
fn parse_drive_letter(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && (bytes[1] == b':' || bytes[1] == b'|')
    {
        let mut out = String::with_capacity(s.len());
        out.push(bytes[0] as char);
        out.push(':');
        out.push_str(&s[2..]);
        Some(out)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stdin() {
        assert_eq!(parse_source("-").unwrap(), Source::Stdin);
    }

    #[test]
    fn parses_bare_path() {
        assert_eq!(
            parse_source("/etc/proxy.pac").unwrap(),
            Source::File(PathBuf::from("/etc/proxy.pac"))
        );
    }

    #[test]
    fn parses_file_single_slash() {
        assert_eq!(
            parse_source("file:/etc/proxy.pac").unwrap(),
            Source::File(PathBuf::from("/etc/proxy.pac"))
        );
    }

    #[test]
    fn parses_file_triple_slash() {
        assert_eq!(
            parse_source("file:///etc/proxy.pac").unwrap(),
            Source::File(PathBuf::from("/etc/proxy.pac"))
        );
    }

    #[test]
    fn parses_file_with_localhost_authority() {
        assert_eq!(
            parse_source("file://localhost/etc/proxy.pac").unwrap(),
            Source::File(PathBuf::from("/etc/proxy.pac"))
        );
    }

    #[test]
    fn parses_file_with_remote_authority_as_unc() {
        let Source::File(path) = parse_source("file://host/share/proxy.pac").unwrap() else {
            panic!("expected File source");
        };
        assert_eq!(path.to_string_lossy(), "\\\\host\\share\\proxy.pac");
    }

    #[test]
    fn parses_windows_drive_colon() {
        assert_eq!(
            parse_source("file:c:/proxy.pac").unwrap(),
            Source::File(PathBuf::from("c:/proxy.pac"))
        );
    }

    #[test]
    fn parses_windows_drive_pipe() {
        assert_eq!(
            parse_source("file:c|/proxy.pac").unwrap(),
            Source::File(PathBuf::from("c:/proxy.pac"))
        );
    }

    #[test]
    fn parses_http_urls_without_resolving() {
        assert_eq!(
            parse_source("http://example.com/proxy.pac").unwrap(),
            Source::Http("http://example.com/proxy.pac".to_owned())
        );
        assert_eq!(
            parse_source("https://example.com/proxy.pac").unwrap(),
            Source::Http("https://example.com/proxy.pac".to_owned())
        );
    }

    #[test]
    fn parses_data_url_base64() {
        let payload = base64::engine::general_purpose::STANDARD.encode(b"hello world");
        let spec = format!("data:text/plain;base64,{payload}");
        assert_eq!(
            parse_source(&spec).unwrap(),
            Source::Data(b"hello world".to_vec())
        );
    }

    #[test]
    fn parses_data_url_plain() {
        assert_eq!(
            parse_source("data:text/plain,hello%20world").unwrap(),
            Source::Data(b"hello world".to_vec())
        );
    }

    #[test]
    fn rejects_malformed_data_url() {
        assert!(matches!(
            parse_source("data:no-comma-here"),
            Err(LoadError::InvalidDataUrl(_))
        ));
    }

    #[tokio::test]
    async fn loads_data_url_bytes() {
        let bytes = load("data:text/plain,hi").await.unwrap();
        assert_eq!(bytes, b"hi");
    }

    #[tokio::test]
    async fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write as _;
        file.write_all(b"function FindProxyForURL(u,h){return \"DIRECT\";}")
            .unwrap();
        let spec = format!("file://{}", file.path().display());
        let bytes = load(&spec).await.unwrap();
        assert_eq!(bytes, b"function FindProxyForURL(u,h){return \"DIRECT\";}");
    }

    #[tokio::test]
    async fn load_rejects_http_without_fetcher() {
        let err = load("https://example.com/proxy.pac").await.unwrap_err();
        assert!(matches!(err, LoadError::HttpUnsupported(_)));
    }

    struct StaticFetcher(&'static [u8]);

    impl Fetcher for StaticFetcher {
        type Error = std::io::Error;

        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, Self::Error> {
            Ok(self.0.to_vec())
        }
    }

    #[tokio::test]
    async fn loads_http_with_fetcher() {
        let fetcher = StaticFetcher(b"PROXY up:8080; DIRECT");
        let bytes = load_with_fetcher("http://example.com/proxy.pac", &fetcher)
            .await
            .unwrap();
        assert_eq!(bytes, b"PROXY up:8080; DIRECT");
    }
}
