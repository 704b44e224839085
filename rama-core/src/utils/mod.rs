//! Utilities in service of the `rama-core` project.

#[doc(hidden)]
pub use ::rama_macros as macros;

pub mod backoff;
pub mod future;
pub mod info;
pub mod latency;
pub mod rng;
pub mod str;
pub mod username;

#[doc(hidden)]
pub mod test_helpers;
