//! HTTP request methods.
//!
//! Re-exported from the `http` crate for the same reason as
//! [`status`](crate::status): no rama-specific behaviour to add.

pub use crate::dep::hyperium::http::Method;
