//! UTF-16 string helpers for Win32 calls.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

/// Encode a string as a NUL-terminated UTF-16 buffer.
pub(crate) fn to_wide(s: impl AsRef<OsStr>) -> Vec<u16> {
    s.as_ref().encode_wide().chain(Some(0)).collect()
}

/// Decode a UTF-16 buffer, stopping at the first NUL.
pub(crate) fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// Decode a NUL-terminated UTF-16 string owned by the system.
///
/// # Safety
///
/// `ptr` must point to a valid NUL-terminated UTF-16 string.
#[allow(unsafe_code)]
pub(crate) unsafe fn from_wide_ptr(ptr: *const u16) -> String {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_roundtrip() {
        let wide = to_wide(r"C:\Users\doc.txt");
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(from_wide(&wide), r"C:\Users\doc.txt");
    }

    #[test]
    fn test_from_wide_without_nul() {
        let buf: Vec<u16> = "abc".encode_utf16().collect();
        assert_eq!(from_wide(&buf), "abc");
    }
}
