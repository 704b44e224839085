//! Utilities in service of the `rama-core` project.

#[macro_use]
pub(crate) mod macros;

pub use ::rama_core::utils::{backoff, future, info, latency, rng, str, username};

#[allow(unused_imports)]
pub(crate) use ::rama_core::utils::test_helpers;
