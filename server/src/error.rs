//! Error classification shared by the server's error enums.

/// Grepable error code and retryable flag, attached to log events.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
