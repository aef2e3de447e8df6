//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::{Backend, Config};
use crate::registry::Hive;

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Registry hive to read from (overrides the config file)
    #[arg(long, value_enum)]
    pub hive: Option<HiveArg>,

    /// Key path below the hive (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    pub key: Option<String>,

    /// Only read values directly under the key
    #[arg(long)]
    pub no_recurse: bool,

    /// How to turn id lists into paths (overrides the config file)
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,
}

impl ScanCommand {
    /// Apply the command line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(hive) = self.hive {
            config.registry.hive = hive.into();
        }
        if let Some(key) = &self.key {
            config.registry.key_path.clone_from(key);
        }
        if self.no_recurse {
            config.registry.recursive = false;
        }
        if let Some(backend) = self.backend {
            config.decode.backend = backend.into();
        }
    }
}

/// Pidl command arguments.
#[derive(Debug, Args)]
pub struct PidlCommand {
    /// The id list as hex (plain, `hex:14,00,...` or space separated)
    pub hex: String,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Registry hive argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HiveArg {
    /// `HKEY_CURRENT_USER`
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE`
    LocalMachine,
    /// `HKEY_USERS`
    Users,
}

impl From<HiveArg> for Hive {
    fn from(arg: HiveArg) -> Self {
        match arg {
            HiveArg::CurrentUser => Self::CurrentUser,
            HiveArg::LocalMachine => Self::LocalMachine,
            HiveArg::Users => Self::Users,
        }
    }
}

/// Decode backend argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Windows shell API
    Shell,
    /// Built-in parser
    Builtin,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Shell => Self::Shell,
            BackendArg::Builtin => Self::Builtin,
        }
    }
}
