//! HTTP header types and well-known header name constants.
//!
//! Re-exported from the `http` crate, same as [`method`](crate::method) and
//! [`status`](crate::status): `HeaderMap`/`HeaderName`/`HeaderValue` and the
//! standard header-name constants need no rama-specific behaviour.

pub use crate::dep::hyperium::http::header::*;
