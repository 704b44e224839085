//! Hop-by-hop header stripping and the proxy-specific header conventions
//! (`Proxy-Authorization` injection, `X-Forwarder-Error` warnings).
//!
//! The stripping algorithm itself — drain headers named in a `Connection`
//! header first, then remove a fixed hop-by-hop list — is ported as a free
//! function from `rama-http`'s `layer::remove_header` middleware; rama-proxy
//! applies it directly rather than wrapping it in a `Layer`, since the
//! dispatcher pipeline here is plain functions, not a `Service` stack.

use rama_http_headers::{Connection, HeaderMapExt};
use rama_http_types::{HeaderMap, HeaderName, HeaderValue, header};

use crate::credential::BasicCredential;

fn x_forwarded_for() -> HeaderName {
    HeaderName::from_static("x-forwarded-for")
}

fn x_forwarded_host() -> HeaderName {
    HeaderName::from_static("x-forwarded-host")
}

fn x_forwarded_proto() -> HeaderName {
    HeaderName::from_static("x-forwarded-proto")
}

fn proxy_connection() -> HeaderName {
    HeaderName::from_static("proxy-connection")
}

fn keep_alive() -> HeaderName {
    HeaderName::from_static("keep-alive")
}

/// Name of the warning header carried on synthesized error responses.
pub fn x_forwarder_error() -> HeaderName {
    HeaderName::from_static("x-forwarder-error")
}

/// Strip hop-by-hop headers from an inbound/outbound request, per RFC 7230
/// §6.1 plus the de-facto `X-Forwarded-*`/`Proxy-Connection` extensions.
pub fn strip_hop_by_hop_request_headers(headers: &mut HeaderMap) {
    drain_connection_listed_headers(headers);
    for name in [
        header::CONNECTION,
        proxy_connection(),
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
        x_forwarded_for(),
        x_forwarded_host(),
        x_forwarded_proto(),
    ] {
        while headers.remove(&name).is_some() {
            tracing::trace!("removed hop-by-hop request header: {name}");
        }
    }
}

/// Strip hop-by-hop headers from a response before writing it back to the
/// client.
pub fn strip_hop_by_hop_response_headers(headers: &mut HeaderMap) {
    drain_connection_listed_headers(headers);
    for name in [
        header::CONNECTION,
        keep_alive(),
        header::PROXY_AUTHENTICATE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ] {
        while headers.remove(&name).is_some() {
            tracing::trace!("removed hop-by-hop response header: {name}");
        }
    }
}

fn drain_connection_listed_headers(headers: &mut HeaderMap) {
    while let Some(connection) = headers.typed_get::<Connection>() {
        for name in connection.iter_headers() {
            while headers.remove(name).is_some() {
                tracing::trace!("removed header listed in Connection header: {name}");
            }
        }
        let _ = headers.remove(header::CONNECTION);
    }
}

/// Build a `Basic …` header value, for either `Authorization` (site
/// credentials) or `Proxy-Authorization` (upstream credentials) — the two
/// differ only in which header name the caller inserts it under.
pub fn basic_credential_header_value(credential: &BasicCredential) -> HeaderValue {
    let value = format!("Basic {}", credential.to_header_value());
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("Basic"))
}

/// Build an `X-Forwarder-Error` header value for a synthesized warning.
pub fn forwarder_error_value(message: &str) -> HeaderValue {
    let sanitized: String = message.chars().filter(|c| !c.is_control()).collect();
    HeaderValue::from_str(&sanitized).unwrap_or_else(|_| HeaderValue::from_static("forwarder error"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fixed_hop_by_hop_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::PROXY_AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        headers.insert(header::TE, HeaderValue::from_static("trailers"));
        headers.insert(x_forwarded_for(), HeaderValue::from_static("10.0.0.1"));
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));

        strip_hop_by_hop_request_headers(&mut headers);

        assert!(!headers.contains_key(header::PROXY_AUTHORIZATION));
        assert!(!headers.contains_key(header::TE));
        assert!(!headers.contains_key(x_forwarded_for()));
        assert!(headers.contains_key(header::HOST));
    }

    #[test]
    fn strips_headers_named_in_connection_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("x-custom"));
        headers.insert(
            HeaderName::from_static("x-custom"),
            HeaderValue::from_static("drop-me"),
        );
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));

        strip_hop_by_hop_request_headers(&mut headers);

        assert!(!headers.contains_key(header::CONNECTION));
        assert!(!headers.contains_key(HeaderName::from_static("x-custom")));
        assert!(headers.contains_key(header::HOST));
    }

    #[test]
    fn strips_fixed_hop_by_hop_response_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop_response_headers(&mut headers);

        assert!(!headers.contains_key(header::TRANSFER_ENCODING));
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn basic_credential_header_value_is_basic_base64() {
        let credential = BasicCredential::new("Aladdin", "open sesame");
        let value = basic_credential_header_value(&credential);
        assert_eq!(value.to_str().unwrap(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }
}
