//! Utilities crate for rama, shared by the proxy core crates.
//!
//! This crate has no `rama-core` dependency on purpose: it sits below
//! `rama-core` in the dependency graph and is free to be depended upon by it.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod loader;
pub mod macros;
pub mod str;
pub mod test_helpers;
