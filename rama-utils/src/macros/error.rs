//! Helper macro for defining zero-field, statically-documented error types.

/// Define a unit struct that implements [`std::error::Error`], using the
/// item's doc comment as its `Display` message.
///
/// ```ignore
/// rama_utils::macros::error::static_str_error! {
///     #[doc = "origin is not valid"]
///     pub struct InvalidOrigin;
/// }
/// ```
#[macro_export]
macro_rules! static_str_error {
    (
        #[doc = $msg:expr]
        $vis:vis struct $name:ident;
    ) => {
        #[doc = $msg]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name {
            _priv: (),
        }

        impl $name {
            #[doc = $msg]
            $vis fn new() -> Self {
                Self { _priv: () }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($msg)
            }
        }

        impl ::std::error::Error for $name {}
    };
}

pub use static_str_error;
