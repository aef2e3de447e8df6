//! Error type for Win32 calls.

use thiserror::Error;
use windows_sys::Win32::Foundation::{
    ERROR_FILE_NOT_FOUND, ERROR_INVALID_DRIVE, ERROR_NONE_MAPPED, ERROR_PATH_NOT_FOUND,
};

/// A failed Win32 call.
#[derive(Debug, Error)]
pub enum WindowsError {
    /// A Win32 API returned an error code.
    #[error("{function} failed with Win32 error {code}")]
    Api {
        /// Name of the failing API function.
        function: &'static str,
        /// The Win32 error code.
        code: u32,
    },

    /// The shell could not map an item id list to a filesystem path.
    #[error("shell item id list does not resolve to a filesystem path")]
    NotFileSystemPath,

    /// A buffer handed to a Win32 API was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for Win32 operations.
pub type Result<T> = std::result::Result<T, WindowsError>;

impl WindowsError {
    pub(crate) fn api(function: &'static str, code: u32) -> Self {
        Self::Api { function, code }
    }

    /// Build an error from the calling thread's last Win32 error.
    pub(crate) fn last(function: &'static str) -> Self {
        // SAFETY: GetLastError only reads thread-local state.
        #[allow(unsafe_code)]
        let code = unsafe { windows_sys::Win32::Foundation::GetLastError() };
        Self::api(function, code)
    }

    /// The Win32 error code, if this error carries one.
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if the error means the file or path does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code(),
            Some(ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND | ERROR_INVALID_DRIVE)
        )
    }

    /// Check if the error means no account is mapped to a SID.
    #[must_use]
    pub fn is_none_mapped(&self) -> bool {
        self.code() == Some(ERROR_NONE_MAPPED)
    }
}
