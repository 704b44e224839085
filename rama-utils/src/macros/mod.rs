//! Declarative macros shared across the `rama` crate family.

pub mod error;

/// Given a consuming "with"-style builder method, also generate a
/// `set_`-prefixed mutating sibling sharing the same body.
///
/// ```ignore
/// generate_set_and_with! {
///     /// Set the status code.
///     pub fn status_code(mut self, status_code: StatusCode) -> Self {
///         self.status_code = status_code;
///         self
///     }
/// }
/// ```
///
/// expands to the `status_code` method verbatim, plus
/// `set_status_code(&mut self, status_code: StatusCode) -> &mut Self`.
#[macro_export]
macro_rules! generate_set_and_with {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident(mut self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> Self {
            $($body:tt)*
        }
    ) => {
        $(#[$meta])*
        $vis fn $name(mut self $(, $arg: $arg_ty)*) -> Self {
            $($body)*
        }

        ::paste::paste! {
            $(#[$meta])*
            $vis fn [<set_ $name>](&mut self $(, $arg: $arg_ty)*) -> &mut Self {
                $($body)*
            }
        }
    };
}

pub use generate_set_and_with;

/// Forwards `inner`/`inner_mut`/`into_inner` accessors to a single field
/// named `inner`, for newtype service wrappers that hold one inner service.
///
/// Used by layer services that wrap a single inner service (e.g. `UpgradeService`,
/// `AddExtensionService`) to expose these without repeating the boilerplate at
/// every call site.
#[macro_export]
macro_rules! define_inner_service_accessors {
    () => {
        /// Gets a reference to the underlying service.
        pub fn inner(&self) -> &S {
            &self.inner
        }

        /// Gets a mutable reference to the underlying service.
        pub fn inner_mut(&mut self) -> &mut S {
            &mut self.inner
        }

        /// Consumes `self`, returning the underlying service.
        pub fn into_inner(self) -> S {
            self.inner
        }
    };
}

pub use define_inner_service_accessors;
