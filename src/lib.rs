//! `rama`: a modular toolkit for building forwarding HTTP(S) proxies.
//!
//! This crate is a thin facade: each module below is a re-export of a
//! standalone `rama-*` crate, gated behind the feature of the same name.
//! Depend on the sub-crates directly if you only need one piece; depend on
//! `rama` with the features you want if you'd rather have one Cargo.toml
//! line and one version to track.

#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod crypto {
    //! X.509 certificate generation and signing, re-exported from `rama-crypto`.
    pub use rama_crypto::*;
}

pub mod core {
    //! Service/layer traits, context and the executor runtime, re-exported
    //! from `rama-core`.
    pub use rama_core::*;
}

#[cfg(feature = "net")]
#[cfg_attr(docsrs, doc(cfg(feature = "net")))]
pub mod net {
    //! Address types and network primitives, re-exported from `rama-net`.
    pub use rama_net::*;
}

#[cfg(feature = "dns")]
#[cfg_attr(docsrs, doc(cfg(feature = "dns")))]
pub mod dns {
    //! DNS resolution, re-exported from `rama-dns`.
    pub use rama_dns::*;
}

#[cfg(feature = "rustls")]
#[cfg_attr(docsrs, doc(cfg(feature = "rustls")))]
pub mod tls {
    //! TLS client/server support backed by `rustls`, re-exported from
    //! `rama-tls-rustls`.
    pub use rama_tls_rustls::*;
}

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod http {
    //! HTTP types, layers and services, re-exported from `rama-http`.
    pub use rama_http::*;
}

#[cfg(feature = "http-full")]
#[cfg_attr(docsrs, doc(cfg(feature = "http-full")))]
pub mod http_core {
    //! The HTTP/1.1 and HTTP/2 wire implementation, re-exported from
    //! `rama-http-core`.
    pub use rama_http_core::*;
}

#[cfg(feature = "pac")]
#[cfg_attr(docsrs, doc(cfg(feature = "pac")))]
pub mod pac {
    //! Proxy Auto-Config (`.pac`) evaluation, re-exported from `rama-pac`.
    pub use rama_pac::*;
}

#[cfg(feature = "proxy")]
#[cfg_attr(docsrs, doc(cfg(feature = "proxy")))]
pub mod proxy {
    //! The forwarding proxy core: dispatcher, tunnel engine, MITM engine and
    //! proxy selection, re-exported from `rama-proxy`.
    pub use rama_proxy::*;
}

#[cfg(feature = "socks5")]
#[cfg_attr(docsrs, doc(cfg(feature = "socks5")))]
pub mod socks5 {
    //! SOCKS5 client and server support, re-exported from `rama-socks5`.
    pub use rama_socks5::*;
}

#[doc(hidden)]
pub use rama_utils as utils;

/// Alias for a type-erased error type, matching the error type used
/// throughout the `rama-*` crates' public APIs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
