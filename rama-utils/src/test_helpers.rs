//! Small assertions for auto-trait coverage, used in `#[cfg(test)]` modules
//! across the workspace (e.g. `rama-core/src/service/svc.rs`).

/// Assert that `T` is `Send`. Call from a test to document and enforce that
/// a newly introduced public type stays usable across an `.await` point in a
/// multi-threaded runtime.
pub fn assert_send<T: Send>() {}

/// Assert that `T` is `Sync`. Call from a test to document and enforce that
/// a newly introduced public type stays safely shareable across threads.
pub fn assert_sync<T: Sync>() {}

/// Assert that `T` is `Clone`.
pub fn assert_clone<T: Clone>() {}
