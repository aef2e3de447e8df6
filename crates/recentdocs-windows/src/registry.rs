//! Read-only registry enumeration.
//!
//! Opens a key under one of the predefined hives and returns its
//! `REG_BINARY` values, optionally descending into subkeys.

#![allow(unsafe_code)]

use std::ptr;

use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegEnumKeyExW, RegEnumValueW, RegOpenKeyExW, RegQueryInfoKeyW, HKEY,
    HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ, REG_BINARY,
};

use crate::error::{Result, WindowsError};
use crate::wide::{from_wide, to_wide};

/// Predefined registry hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hive {
    /// `HKEY_CURRENT_USER`
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`
    LocalMachine,
    /// `HKEY_USERS`, where offline hives are mounted with `reg load`.
    Users,
}

impl Hive {
    fn root(self) -> HKEY {
        match self {
            Self::CurrentUser => HKEY_CURRENT_USER,
            Self::LocalMachine => HKEY_LOCAL_MACHINE,
            Self::Users => HKEY_USERS,
        }
    }

    /// The hive's conventional name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
            Self::Users => "HKEY_USERS",
        }
    }
}

/// A binary registry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Subkey path relative to the enumerated key; empty for the key itself.
    pub subkey: String,
    /// Value name.
    pub name: String,
    /// Raw value data.
    pub data: Vec<u8>,
}

/// Open registry key, closed on drop.
#[derive(Debug)]
struct Key(HKEY);

#[derive(Debug, Default)]
struct KeyInfo {
    subkeys: u32,
    max_subkey_len: u32,
    values: u32,
    max_value_name_len: u32,
    max_value_len: u32,
}

impl Key {
    fn open(parent: HKEY, path: &str) -> Result<Self> {
        let wide = to_wide(path);
        let mut hkey: HKEY = ptr::null_mut();
        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let status = unsafe { RegOpenKeyExW(parent, wide.as_ptr(), 0, KEY_READ, &mut hkey) };
        if status != ERROR_SUCCESS {
            return Err(WindowsError::api("RegOpenKeyExW", status));
        }
        Ok(Self(hkey))
    }

    fn info(&self) -> Result<KeyInfo> {
        let mut info = KeyInfo::default();
        // SAFETY: every out pointer refers to a live u32 or is null where optional.
        let status = unsafe {
            RegQueryInfoKeyW(
                self.0,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null(),
                &mut info.subkeys,
                &mut info.max_subkey_len,
                ptr::null_mut(),
                &mut info.values,
                &mut info.max_value_name_len,
                &mut info.max_value_len,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(WindowsError::api("RegQueryInfoKeyW", status));
        }
        Ok(info)
    }

    fn binary_values(&self, info: &KeyInfo, subkey: &str, out: &mut Vec<RawValue>) -> Result<()> {
        for index in 0..info.values {
            let mut name = vec![0u16; info.max_value_name_len as usize + 1];
            let mut name_len = u32::try_from(name.len())
                .map_err(|_| WindowsError::InvalidInput("value name too long".to_string()))?;
            let mut data = vec![0u8; info.max_value_len as usize];
            let mut data_len = info.max_value_len;
            let mut kind = 0u32;

            // SAFETY: buffers are sized from RegQueryInfoKeyW and the lengths passed match.
            let status = unsafe {
                RegEnumValueW(
                    self.0,
                    index,
                    name.as_mut_ptr(),
                    &mut name_len,
                    ptr::null(),
                    &mut kind,
                    data.as_mut_ptr(),
                    &mut data_len,
                )
            };
            match status {
                ERROR_SUCCESS => {}
                ERROR_NO_MORE_ITEMS => break,
                code => return Err(WindowsError::api("RegEnumValueW", code)),
            }

            let name = from_wide(&name[..name_len as usize]);
            if kind != REG_BINARY {
                debug!(subkey, name = %name, kind, "Skipping non-binary value");
                continue;
            }
            data.truncate(data_len as usize);
            out.push(RawValue {
                subkey: subkey.to_string(),
                name,
                data,
            });
        }
        Ok(())
    }

    fn subkey_names(&self, info: &KeyInfo) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(info.subkeys as usize);
        for index in 0..info.subkeys {
            let mut name = vec![0u16; info.max_subkey_len as usize + 1];
            let mut name_len = u32::try_from(name.len())
                .map_err(|_| WindowsError::InvalidInput("subkey name too long".to_string()))?;

            // SAFETY: name buffer length matches `name_len`; optional outputs are null.
            let status = unsafe {
                RegEnumKeyExW(
                    self.0,
                    index,
                    name.as_mut_ptr(),
                    &mut name_len,
                    ptr::null(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                )
            };
            match status {
                ERROR_SUCCESS => names.push(from_wide(&name[..name_len as usize])),
                ERROR_NO_MORE_ITEMS => break,
                code => return Err(WindowsError::api("RegEnumKeyExW", code)),
            }
        }
        Ok(names)
    }

    fn collect(&self, subkey: &str, recursive: bool, out: &mut Vec<RawValue>) -> Result<()> {
        let info = self.info()?;
        self.binary_values(&info, subkey, out)?;
        if !recursive {
            return Ok(());
        }

        for name in self.subkey_names(&info)? {
            let child = Key::open(self.0, &name)?;
            let path = if subkey.is_empty() {
                name
            } else {
                format!("{subkey}\\{name}")
            };
            child.collect(&path, recursive, out)?;
        }
        Ok(())
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        // SAFETY: the handle was opened by RegOpenKeyExW and is closed once.
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

/// Read every `REG_BINARY` value under `hive\path`.
///
/// With `recursive`, subkeys are visited depth-first after the key's own
/// values, and each value records its subkey path relative to `path`.
///
/// # Errors
///
/// Returns an error if the key or any visited subkey cannot be opened or
/// enumerated.
pub fn read_binary_values(hive: Hive, path: &str, recursive: bool) -> Result<Vec<RawValue>> {
    debug!(hive = hive.name(), path, recursive, "Enumerating registry key");
    let key = Key::open(hive.root(), path)?;
    let mut values = Vec::new();
    key.collect("", recursive, &mut values)?;
    debug!(count = values.len(), "Read binary registry values");
    Ok(values)
}
