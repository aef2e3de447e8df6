//! Shell item id list to filesystem path conversion.

#![allow(unsafe_code)]

use tracing::trace;
use windows_sys::Win32::UI::Shell::Common::ITEMIDLIST;
use windows_sys::Win32::UI::Shell::{SHGetPathFromIDListEx, GPFIDL_DEFAULT};

use crate::error::{Result, WindowsError};
use crate::wide::from_wide;

/// Longest path the shell can hand back with `\\?\`-style long path support.
const PATH_CAPACITY: usize = 32_768;

/// Check that every size-prefixed item lies inside `data`.
///
/// Returns the length of the list up to and including its terminator, or
/// `data.len()` if the terminator is missing.
fn checked_len(data: &[u8]) -> Result<usize> {
    let mut offset = 0;
    while offset + 2 <= data.len() {
        let size = usize::from(u16::from_le_bytes([data[offset], data[offset + 1]]));
        if size == 0 {
            return Ok(offset + 2);
        }
        if size < 2 || offset + size > data.len() {
            return Err(WindowsError::InvalidInput(format!(
                "shell item at offset {offset} declares {size} bytes, {} available",
                data.len() - offset
            )));
        }
        offset += size;
    }
    Ok(data.len())
}

/// Resolve a packed item id list (as stored in the registry) to an absolute
/// filesystem path with `SHGetPathFromIDListEx`.
///
/// # Errors
///
/// Returns an error if the list is truncated or does not name a filesystem
/// object (for example a control panel item).
pub fn path_from_id_list(data: &[u8]) -> Result<String> {
    let len = checked_len(data)?;

    // The shell reads until a zero-sized item, so always terminate the copy.
    let mut list = Vec::with_capacity(len + 2);
    list.extend_from_slice(&data[..len]);
    list.extend_from_slice(&[0, 0]);

    let mut path = vec![0u16; PATH_CAPACITY];
    let capacity = u32::try_from(path.len())
        .map_err(|_| WindowsError::InvalidInput("path buffer too large".to_string()))?;

    // SAFETY: `list` is a bounds-checked, terminated id list (ITEMIDLIST is
    // packed, so any byte alignment is valid) and `path` holds `capacity` chars.
    let ok = unsafe {
        SHGetPathFromIDListEx(
            list.as_ptr().cast::<ITEMIDLIST>(),
            path.as_mut_ptr(),
            capacity,
            GPFIDL_DEFAULT,
        )
    };
    if ok == 0 {
        return Err(WindowsError::NotFileSystemPath);
    }

    let path = from_wide(&path);
    trace!(path = %path, "Resolved item id list");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_len_stops_at_terminator() {
        let data = [4, 0, 0xAA, 0xBB, 0, 0, 0xFF];
        assert_eq!(checked_len(&data).unwrap(), 6);
    }

    #[test]
    fn test_checked_len_rejects_overrun() {
        let data = [20, 0, 0x1F, 0x50];
        assert!(checked_len(&data).is_err());
    }

    #[test]
    fn test_checked_len_rejects_undersized_item() {
        let data = [1, 0, 0, 0];
        assert!(checked_len(&data).is_err());
    }

    #[test]
    fn test_control_panel_is_not_a_path() {
        // Root item for {21EC2020-3AEA-1069-A2DD-08002B30309D}.
        let data = [
            0x14, 0x00, 0x1F, 0x50, 0x20, 0x20, 0xEC, 0x21, 0xEA, 0x3A, 0x69, 0x10, 0xA2, 0xDD,
            0x08, 0x00, 0x2B, 0x30, 0x30, 0x9D, 0x00, 0x00,
        ];
        assert!(matches!(
            path_from_id_list(&data),
            Err(WindowsError::NotFileSystemPath)
        ));
    }
}
