//! Minimal SOCKS5 `CONNECT`-only client (RFC 1928), used by the forwarding
//! proxy's dispatcher and tunnel engine when a selected proxy entry is
//! `SOCKS`/`SOCKS4`/`SOCKS5`.
//!
//! Server-side SOCKS5 and the `BIND`/`UDP ASSOCIATE` commands are out of
//! scope: this crate only dials *out* through a SOCKS5 proxy on behalf of
//! the forwarding core.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod client;
mod error;

pub use client::connect;
pub use error::Socks5Error;
