//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::ffi::{OsStr, OsString};

use clap::Parser;
use clap_complete::Shell;

use crate::backend::KeyringItemStore;
use crate::config::Settings;
use crate::errors::{KeychainError, Result};
use crate::keychain::CredentialStore;

/// keystash CLI: store generic passwords in the OS keychain.
#[derive(Parser)]
#[command(
    name = "keystash",
    about = "Generic-password credential store for the OS keychain",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Service the items belong to (default: from .keystash.toml, else "keystash")
    #[arg(short, long, global = true, env = "KEYSTASH_SERVICE")]
    pub service: Option<String>,

    /// Access group for items shared between applications
    #[arg(short = 'g', long, global = true)]
    pub access_group: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Store a secret, replacing any existing one for the account
    Set {
        /// Account name the secret belongs to
        account: String,
        /// Secret value (omit for interactive prompt)
        value: Option<OsString>,
        /// Treat the value as base64 and store the decoded bytes
        #[arg(long)]
        base64: bool,
    },

    /// Print a stored secret
    Get {
        /// Account name
        account: String,
        /// Print the raw bytes as base64
        #[arg(long)]
        base64: bool,
    },

    /// Delete a stored secret
    Delete {
        /// Account name
        account: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
        /// Succeed even if nothing is stored for the account
        #[arg(long)]
        ignore_missing: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum, ignore_case = true)]
        shell: Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.keystash.toml` from the working directory and apply CLI overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    Ok(settings.with_overrides(cli.service.as_deref(), cli.access_group.as_deref()))
}

/// Open the OS keyring with the configured serialization policy.
pub fn open_store(settings: &Settings) -> CredentialStore<KeyringItemStore> {
    CredentialStore::with_write_serialization(KeyringItemStore::new(), settings.write_serialization)
}

/// Convert a value argument into a UTF-8 string.
///
/// Platform strings that are not valid Unicode cannot be stored as text.
pub fn value_to_string(value: &OsStr) -> Result<String> {
    value
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| KeychainError::FailedToEncodeStringAsData.into())
}

/// Human-readable name for an item, used in messages.
pub fn describe(settings: &Settings, account: &str) -> String {
    match &settings.access_group {
        Some(group) => format!("'{account}' in service '{}' (group '{group}')", settings.service),
        None => format!("'{account}' in service '{}'", settings.service),
    }
}
