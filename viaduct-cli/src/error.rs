//! Error utilities

use rama::core::error::BoxError;

/// An error carrying the process exit code it should be reported with.
#[derive(Debug)]
pub struct ErrorWithExitCode {
    code: i32,
    error: BoxError,
}

impl ErrorWithExitCode {
    /// Create a new error with an exit code.
    pub fn new(code: i32, error: impl Into<BoxError>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }

    /// The exit code this error should terminate the process with.
    pub fn exit_code(&self) -> i32 {
        self.code
    }
}

impl From<BoxError> for ErrorWithExitCode {
    fn from(error: BoxError) -> Self {
        Self { code: 1, error }
    }
}

impl std::fmt::Display for ErrorWithExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.error)
    }
}

impl std::error::Error for ErrorWithExitCode {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_defaults_to_one_via_box_error_conversion() {
        let err: ErrorWithExitCode = std::io::Error::other("boom").into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn exit_code_is_preserved_when_constructed_explicitly() {
        let err = ErrorWithExitCode::new(7, std::io::Error::other("boom"));
        assert_eq!(err.exit_code(), 7);
        assert_eq!(err.to_string(), "[7] boom");
    }
}
