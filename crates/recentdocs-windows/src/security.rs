//! File ownership queries.
//!
//! SIDs cross this boundary in their string form (`S-1-5-21-...`), so callers
//! never hold system-allocated SID memory.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::path::Path;
use std::ptr;

use tracing::trace;
use windows_sys::core::PWSTR;
use windows_sys::Win32::Foundation::{
    GetLastError, LocalFree, ERROR_INSUFFICIENT_BUFFER, ERROR_SUCCESS,
};
use windows_sys::Win32::Security::Authorization::{
    ConvertSidToStringSidW, ConvertStringSidToSidW, GetNamedSecurityInfoW, SE_FILE_OBJECT,
};
use windows_sys::Win32::Security::{
    LookupAccountSidW, OWNER_SECURITY_INFORMATION, PSECURITY_DESCRIPTOR, PSID, SID_NAME_USE,
};

use crate::error::{Result, WindowsError};
use crate::wide::{from_wide, from_wide_ptr, to_wide};

/// An account name and the domain it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account name.
    pub name: String,
    /// Domain or machine name.
    pub domain: String,
}

/// Memory returned by the system that must be released with `LocalFree`.
struct LocalMemory(*mut c_void);

impl Drop for LocalMemory {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // SAFETY: the pointer was allocated by the system with LocalAlloc.
            unsafe {
                LocalFree(self.0);
            }
        }
    }
}

/// Render a binary SID as its string form.
fn sid_to_string(sid: PSID) -> Result<String> {
    let mut text: PWSTR = ptr::null_mut();
    // SAFETY: `sid` points into a live security descriptor.
    if unsafe { ConvertSidToStringSidW(sid, &mut text) } == 0 {
        return Err(WindowsError::last("ConvertSidToStringSidW"));
    }
    let _memory = LocalMemory(text.cast());
    // SAFETY: ConvertSidToStringSidW returned a NUL-terminated string.
    Ok(unsafe { from_wide_ptr(text) })
}

/// Query the owner SID of a file, as a string.
///
/// # Errors
///
/// Returns an error if the security descriptor cannot be read. A missing
/// file reports `ERROR_FILE_NOT_FOUND` (see [`WindowsError::is_not_found`]).
pub fn owner_sid(path: &Path) -> Result<String> {
    let wide = to_wide(path.as_os_str());
    let mut owner: PSID = ptr::null_mut();
    let mut descriptor: PSECURITY_DESCRIPTOR = ptr::null_mut();

    // SAFETY: `wide` is NUL-terminated; the owner SID points into `descriptor`,
    // which stays alive until `_memory` is dropped.
    let status = unsafe {
        GetNamedSecurityInfoW(
            wide.as_ptr(),
            SE_FILE_OBJECT,
            OWNER_SECURITY_INFORMATION,
            &mut owner,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            &mut descriptor,
        )
    };
    if status != ERROR_SUCCESS {
        return Err(WindowsError::api("GetNamedSecurityInfoW", status));
    }
    let _memory = LocalMemory(descriptor);

    if owner.is_null() {
        return Err(WindowsError::InvalidInput(format!(
            "{} has no owner",
            path.display()
        )));
    }
    let sid = sid_to_string(owner)?;
    trace!(path = %path.display(), sid = %sid, "Read owner SID");
    Ok(sid)
}

/// Translate a SID string into the account it names.
///
/// # Errors
///
/// Returns an error if the string is not a SID or no account maps to it
/// (orphaned SID, domain controller unreachable).
pub fn lookup_account(sid: &str) -> Result<Account> {
    let wide = to_wide(sid);
    let mut binary: PSID = ptr::null_mut();
    // SAFETY: `wide` is NUL-terminated; the SID is freed by `_memory`.
    if unsafe { ConvertStringSidToSidW(wide.as_ptr(), &mut binary) } == 0 {
        return Err(WindowsError::last("ConvertStringSidToSidW"));
    }
    let _memory = LocalMemory(binary);

    let mut name_len = 0u32;
    let mut domain_len = 0u32;
    let mut sid_use: SID_NAME_USE = 0;

    // First call only sizes the buffers and is expected to fail.
    // SAFETY: null buffers with zero lengths are the documented sizing form.
    unsafe {
        LookupAccountSidW(
            ptr::null(),
            binary,
            ptr::null_mut(),
            &mut name_len,
            ptr::null_mut(),
            &mut domain_len,
            &mut sid_use,
        );
    }
    // SAFETY: reads thread-local state.
    let code = unsafe { GetLastError() };
    if code != ERROR_INSUFFICIENT_BUFFER {
        return Err(WindowsError::api("LookupAccountSidW", code));
    }

    let mut name = vec![0u16; name_len as usize];
    let mut domain = vec![0u16; domain_len as usize];
    // SAFETY: buffers are sized by the previous call.
    let ok = unsafe {
        LookupAccountSidW(
            ptr::null(),
            binary,
            name.as_mut_ptr(),
            &mut name_len,
            domain.as_mut_ptr(),
            &mut domain_len,
            &mut sid_use,
        )
    };
    if ok == 0 {
        return Err(WindowsError::last("LookupAccountSidW"));
    }

    Ok(Account {
        name: from_wide(&name),
        domain: from_wide(&domain),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_well_known_sid() {
        // S-1-5-18 is LocalSystem on every Windows machine.
        let account = lookup_account("S-1-5-18").unwrap();
        assert!(!account.name.is_empty());
    }

    #[test]
    fn test_lookup_invalid_sid_string() {
        assert!(lookup_account("not-a-sid").is_err());
    }

    #[test]
    fn test_lookup_orphaned_sid() {
        let result = lookup_account("S-1-5-21-1-2-3-99999");
        assert!(result.is_err());
    }

    #[test]
    fn test_owner_sid_of_missing_file() {
        let err = owner_sid(Path::new(r"C:\recentdocs-test\missing.txt")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_owner_sid_of_existing_file() {
        let exe = std::env::current_exe().unwrap();
        let sid = owner_sid(&exe).unwrap();
        assert!(sid.starts_with("S-1-"));
    }
}
