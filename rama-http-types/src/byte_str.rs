//! A cheaply-clonable string, reserved for header value storage that wants
//! to avoid re-allocating on clone.
//!
//! Nothing in this crate constructs one yet: [`header`](crate::header),
//! [`method`](crate::method), and [`status`](crate::status) all re-export
//! the `http` crate's own types directly rather than a vendored copy, so
//! this alias stays unused until one of them needs a cheaper clone than
//! `String` gives.

#![allow(dead_code)]

pub(crate) type ByteStr = smol_str::SmolStr;
