//! HTTP status codes.
//!
//! Like [`uri`](crate::uri), this module doesn't carry a vendored copy:
//! `StatusCode` needs no rama-specific behaviour beyond what the `http`
//! crate already gives it, so we re-export that directly.

pub use crate::dep::hyperium::http::StatusCode;
