//! Windows-specific implementation for recentdocs.
//!
//! This crate wraps the Win32 APIs recentdocs needs: registry enumeration,
//! file owner queries, SID to account translation and shell item id list
//! to path conversion. Every call is read-only.

#![cfg(windows)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod error;
pub mod registry;
pub mod security;
pub mod shell;
mod wide;

pub use error::{Result, WindowsError};
pub use registry::{read_binary_values, Hive, RawValue};
pub use security::{lookup_account, owner_sid, Account};
pub use shell::path_from_id_list;

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "Windows"
}
