//! Raw recent-document records and where they come from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Display name of a key's unnamed default value.
const DEFAULT_VALUE_NAME: &str = "(Default)";

/// One registry value holding a packed shell item id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntry {
    /// Value name, prefixed with its subkey when read recursively.
    pub name: String,
    /// Raw value data.
    pub data: Vec<u8>,
}

impl RecentEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Predefined registry hive to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hive {
    /// `HKEY_CURRENT_USER`
    #[default]
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`
    LocalMachine,
    /// `HKEY_USERS`, where offline hives are mounted with `reg load`.
    Users,
}

impl Hive {
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

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supplies raw recent entries.
pub trait RegistryReader: fmt::Debug {
    /// Read every entry, in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured key cannot be opened or enumerated.
    fn read_entries(&self) -> Result<Vec<RecentEntry>>;
}

/// Name an entry by its value name and the subkey it was found in.
#[must_use]
pub fn qualified_name(subkey: &str, value: &str) -> String {
    let value = if value.is_empty() {
        DEFAULT_VALUE_NAME
    } else {
        value
    };
    if subkey.is_empty() {
        value.to_string()
    } else {
        format!("{subkey}\\{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name("", "0"), "0");
        assert_eq!(qualified_name("docx", "3"), r"docx\3");
        assert_eq!(qualified_name("*", "MRUListEx"), r"*\MRUListEx");
        assert_eq!(qualified_name("txt", ""), r"txt\(Default)");
    }

    #[test]
    fn test_hive_names() {
        assert_eq!(Hive::default(), Hive::CurrentUser);
        assert_eq!(Hive::CurrentUser.to_string(), "HKEY_CURRENT_USER");
        assert_eq!(Hive::LocalMachine.name(), "HKEY_LOCAL_MACHINE");
        assert_eq!(Hive::Users.name(), "HKEY_USERS");
    }

    #[test]
    fn test_recent_entry_new() {
        let entry = RecentEntry::new("0", [20u8, 0]);
        assert_eq!(entry.name, "0");
        assert_eq!(entry.data, vec![20, 0]);
    }
}
