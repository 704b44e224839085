//! Forwarding HTTP(S) proxy core: proxy entries and PAC return-string
//! parsing, proxy selection (direct / static upstream / PAC-driven) with a
//! localhost policy, site/upstream credential tables, hop-by-hop header
//! handling, outbound request dispatch, and the `CONNECT` tunnel engine.
//!
//! MITM certificate minting for TLS-terminating `CONNECT` lives in
//! `rama-tls-rustls::mitm`; this crate wires a selected [`entry::ProxyEntry`]
//! through to either [`dispatch::Dispatcher`] (plain HTTP requests) or
//! [`tunnel::run`] (`CONNECT` tunnels, optionally after a MITM TLS accept).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod credential;
pub mod dispatch;
pub mod entry;
pub mod h2;
pub mod headers;
pub mod http1;
pub mod mitm;
pub mod select;
pub mod serve;
pub mod tunnel;

pub use credential::{BasicCredential, CredentialTable};
pub use dispatch::{DispatchError, Dispatcher};
pub use entry::{ParseProxyEntryError, ProxyEntry, ProxyEntryList};
pub use h2::Http2Error;
pub use mitm::{MitmEngine, MitmError};
pub use select::{LocalhostDenied, LocalhostPolicy, ProxyMode, ProxySelector};
pub use serve::{ServeError, ServerConfig, handle_connection};
pub use tunnel::TunnelError;
