//! Errors produced while loading or evaluating a PAC script.

use std::fmt;

/// Failure loading, binding, or evaluating a PAC script.
#[derive(Debug)]
pub enum PacError {
    /// The script threw, or failed to parse as JavaScript.
    Script(String),
    /// Neither `FindProxyForURL` nor `FindProxyForURLEx` is defined.
    MissingEntryPoint,
    /// Both `FindProxyForURL` and `FindProxyForURLEx` are defined.
    AmbiguousEntryPoint,
    /// The entry point's return value was not a JavaScript string.
    NonStringReturn,
    /// The entry point returned a non-ASCII string.
    NonAsciiReturn,
    /// `sortIpAddressList` was given an unparsable address.
    InvalidAddress(String),
    /// A pool worker thread could not be spawned or died before reporting
    /// readiness.
    Worker(String),
}

impl fmt::Display for PacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(msg) => write!(f, "PAC script error: {msg}"),
            Self::MissingEntryPoint => {
                write!(f, "PAC script defines neither FindProxyForURL nor FindProxyForURLEx")
            }
            Self::AmbiguousEntryPoint => write!(
                f,
                "PAC script defines both FindProxyForURL and FindProxyForURLEx"
            ),
            Self::NonStringReturn => write!(f, "PAC entry point did not return a string"),
            Self::NonAsciiReturn => write!(f, "PAC entry point returned a non-ASCII string"),
            Self::InvalidAddress(addr) => write!(f, "invalid IP address in PAC helper: {addr}"),
            Self::Worker(msg) => write!(f, "PAC evaluator worker: {msg}"),
        }
    }
}

impl std::error::Error for PacError {}
