//! String helpers shared across the `rama` crate family.

/// The newline sequence native to the target platform: `"\r\n"` on Windows,
/// `"\n"` everywhere else. Used by textual exporters (e.g. cURL command
/// rendering) that want to produce copy-pastable shell snippets.
#[cfg(windows)]
pub const NATIVE_NEWLINE: &str = "\r\n";

/// The newline sequence native to the target platform: `"\r\n"` on Windows,
/// `"\n"` everywhere else. Used by textual exporters (e.g. cURL command
/// rendering) that want to produce copy-pastable shell snippets.
#[cfg(not(windows))]
pub const NATIVE_NEWLINE: &str = "\n";

/// Assert at compile time that a string literal is non-empty, yielding the
/// literal back as a `&'static str`.
///
/// Use this instead of a bare string literal wherever an API documents that
/// it panics (or otherwise rejects) empty input, to push that invariant to
/// compile time for call sites that can afford a literal.
///
/// ```
/// use rama_utils::str::non_empty_str;
///
/// let s: &'static str = non_empty_str!("foo");
/// assert_eq!(s, "foo");
/// ```
#[macro_export]
macro_rules! non_empty_str {
    ($s:literal) => {{
        const _: () = assert!(!$s.is_empty(), "non_empty_str!: literal must not be empty");
        $s
    }};
}

pub use non_empty_str;
