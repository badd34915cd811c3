// ── Central error type ────────────────────────────────────────────────────────
//
// Fallible setup paths (configuration, native calls) return
// `error::Result<T>`.  The interceptor itself never hands these to the host:
// it logs them and stays inert, since file drops are an optional feature.

use thiserror::Error;

/// Every error that Dropgate can produce.
#[derive(Debug, Error)]
pub enum DropError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// Reading or writing the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for `InterceptorConfig`.
    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration file was written by an incompatible version.
    #[error("unsupported configuration version {found} (expected {expected})")]
    ConfigVersion { found: u32, expected: u32 },
}

// Lets `?` work on `windows::core::Result<T>` inside the native backend.
#[cfg(windows)]
impl From<windows::core::Error> for DropError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; Win32 errors appear as 0x8007xxxx.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_shows_function_and_hex_code() {
        let e = DropError::Win32 {
            function: "SetWindowLongPtrW",
            code: 1400,
        };
        assert_eq!(e.to_string(), "SetWindowLongPtrW failed (error 0x00000578)");
    }

    #[test]
    fn version_mismatch_message() {
        let e = DropError::ConfigVersion { found: 7, expected: 1 };
        assert_eq!(
            e.to_string(),
            "unsupported configuration version 7 (expected 1)"
        );
    }

    #[test]
    fn io_error_is_the_source() {
        use std::error::Error as _;
        let e = DropError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(e.source().is_some());
    }
}
