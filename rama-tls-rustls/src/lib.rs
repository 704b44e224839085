//! rustls-backed TLS for rama, including an on-the-fly MITM certificate
//! resolver for the forwarding proxy's TLS-terminating `CONNECT` mode.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod connect;
pub mod mitm;

pub use rustls;
pub use tokio_rustls;
