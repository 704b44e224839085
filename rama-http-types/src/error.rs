//! Error and result types used throughout this crate.
//!
//! Body conversions, URI parsing, and informational-header parsing all fail
//! with a type-erased error rather than a dedicated enum per failure site;
//! [`rama_error::OpaqueError`] already gives us that, so we simply re-export
//! it under the crate-local name this module's callers expect.

/// A type-erased error, as returned by this crate's fallible conversions.
pub type Error = rama_error::OpaqueError;

/// A `Result` whose error defaults to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
