//! Platform capability construction.
//!
//! On Windows the capabilities are backed by the `recentdocs-windows` crate.
//! Elsewhere only the builtin PIDL parser is available; anything that needs
//! the registry, the shell or the security API reports
//! [`Error::UnsupportedPlatform`].

use crate::config::{Backend, RegistryConfig};
#[cfg(not(windows))]
use crate::error::Error;
use crate::error::Result;
use crate::metadata::SecurityResolver;
use crate::pidl::{BuiltinPidlResolver, PidlPathResolver};
use crate::registry::RegistryReader;

/// Name of the platform this binary was built for.
#[must_use]
pub fn platform_name() -> &'static str {
    #[cfg(windows)]
    {
        recentdocs_windows::platform_name()
    }
    #[cfg(not(windows))]
    {
        std::env::consts::OS
    }
}

/// Registry reader for the configured key.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] off Windows.
pub fn registry_reader(config: &RegistryConfig) -> Result<Box<dyn RegistryReader>> {
    #[cfg(windows)]
    {
        Ok(Box::new(windows::WindowsRegistry::new(config)))
    }
    #[cfg(not(windows))]
    {
        let _ = config;
        Err(Error::UnsupportedPlatform {
            operation: "reading the registry",
        })
    }
}

/// Path resolver for the configured backend.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] for the shell backend off Windows.
pub fn pidl_resolver(backend: Backend) -> Result<Box<dyn PidlPathResolver>> {
    match backend {
        Backend::Builtin => Ok(Box::new(BuiltinPidlResolver)),
        #[cfg(windows)]
        Backend::Shell => Ok(Box::new(windows::ShellPidlResolver)),
        #[cfg(not(windows))]
        Backend::Shell => Err(Error::UnsupportedPlatform {
            operation: "the shell decode backend",
        }),
    }
}

/// Owner and account resolver.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] off Windows.
pub fn security_resolver() -> Result<Box<dyn SecurityResolver>> {
    #[cfg(windows)]
    {
        Ok(Box::new(windows::WindowsSecurity))
    }
    #[cfg(not(windows))]
    {
        Err(Error::UnsupportedPlatform {
            operation: "querying file owners",
        })
    }
}

#[cfg(windows)]
mod windows {
    use std::path::{Path, PathBuf};

    use recentdocs_windows as platform;
    use tracing::debug;

    use crate::config::RegistryConfig;
    use crate::error::{Error, Result};
    use crate::metadata::{Account, SecurityResolver, Sid};
    use crate::pidl::PidlPathResolver;
    use crate::registry::{qualified_name, Hive, RecentEntry, RegistryReader};

    impl From<Hive> for platform::Hive {
        fn from(hive: Hive) -> Self {
            match hive {
                Hive::CurrentUser => Self::CurrentUser,
                Hive::LocalMachine => Self::LocalMachine,
                Hive::Users => Self::Users,
            }
        }
    }

    #[derive(Debug)]
    pub(super) struct WindowsRegistry {
        hive: Hive,
        key_path: String,
        recursive: bool,
    }

    impl WindowsRegistry {
        pub(super) fn new(config: &RegistryConfig) -> Self {
            Self {
                hive: config.hive,
                key_path: config.key_path.clone(),
                recursive: config.recursive,
            }
        }
    }

    impl RegistryReader for WindowsRegistry {
        fn read_entries(&self) -> Result<Vec<RecentEntry>> {
            let values =
                platform::read_binary_values(self.hive.into(), &self.key_path, self.recursive)
                    .map_err(|e| {
                        Error::registry(format!("{}\\{}", self.hive, self.key_path), e.to_string())
                    })?;
            debug!(count = values.len(), "Read binary values");

            Ok(values
                .into_iter()
                .map(|value| RecentEntry::new(qualified_name(&value.subkey, &value.name), value.data))
                .collect())
        }
    }

    #[derive(Debug)]
    pub(super) struct WindowsSecurity;

    impl SecurityResolver for WindowsSecurity {
        fn owner_sid(&self, path: &Path) -> Result<Sid> {
            match platform::owner_sid(path) {
                Ok(sid) => Ok(Sid::new(sid)),
                Err(e) if e.is_not_found() => Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                }),
                Err(e) => Err(Error::security(path, e.to_string())),
            }
        }

        fn lookup_account(&self, sid: &Sid) -> Result<Account> {
            match platform::lookup_account(sid.as_str()) {
                Ok(account) => Ok(Account {
                    name: account.name,
                    domain: account.domain,
                }),
                Err(e) if e.is_none_mapped() => {
                    Err(Error::account_lookup(sid.as_str(), "no account mapped"))
                }
                Err(e) => Err(Error::account_lookup(sid.as_str(), e.to_string())),
            }
        }
    }

    #[derive(Debug)]
    pub(super) struct ShellPidlResolver;

    impl PidlPathResolver for ShellPidlResolver {
        fn resolve_path(&self, data: &[u8]) -> Result<PathBuf> {
            platform::path_from_id_list(data)
                .map(PathBuf::from)
                .map_err(|e| Error::pidl(e.to_string()))
        }
    }

}
