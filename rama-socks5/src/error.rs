use std::fmt;

/// Failure negotiating a SOCKS5 `CONNECT` with an upstream proxy.
#[derive(Debug)]
pub enum Socks5Error {
    /// A read/write on the proxy connection failed.
    Io(std::io::Error),
    /// The proxy doesn't speak SOCKS5, or rejected every offered auth method.
    NoAcceptableAuthMethod,
    /// Username/password authentication was rejected.
    AuthFailed,
    /// The proxy's `CONNECT` reply carried a non-success status.
    RequestFailed(u8),
    /// A reply from the proxy didn't parse as a well-formed SOCKS5 message.
    Protocol(&'static str),
    /// The target hostname is neither a valid IP literal nor short enough
    /// to encode as a SOCKS5 domain name (max 255 bytes).
    InvalidAddress(&'static str),
}

impl fmt::Display for Socks5Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "SOCKS5 I/O error: {e}"),
            Self::NoAcceptableAuthMethod => write!(f, "SOCKS5 proxy accepted no offered auth method"),
            Self::AuthFailed => write!(f, "SOCKS5 username/password authentication failed"),
            Self::RequestFailed(code) => write!(f, "SOCKS5 CONNECT failed with reply code {code}"),
            Self::Protocol(msg) => write!(f, "malformed SOCKS5 message: {msg}"),
            Self::InvalidAddress(msg) => write!(f, "invalid SOCKS5 target address: {msg}"),
        }
    }
}

impl std::error::Error for Socks5Error {}

impl From<std::io::Error> for Socks5Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
