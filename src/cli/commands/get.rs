//! `keystash get`: print a stored secret.

use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::backend::ItemStore;
use crate::cli::output;
use crate::cli::{describe, load_settings, open_store, Cli};
use crate::config::Settings;
use crate::errors::{KeychainError, KeystashError, Result};
use crate::keychain::CredentialStore;

/// Execute the `get` command.
pub fn execute(cli: &Cli, account: &str, base64: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let store = open_store(&settings);
    run(&store, &settings, account, base64, &mut io::stdout().lock())
}

/// Write the secret for `account` to `out`, as text or as base64.
pub fn run<S: ItemStore>(
    store: &CredentialStore<S>,
    settings: &Settings,
    account: &str,
    base64: bool,
    out: &mut impl Write,
) -> Result<()> {
    let group = settings.access_group.as_deref();

    if base64 {
        let bytes = store
            .get(account, &settings.service, group)?
            .ok_or_else(|| KeystashError::NotFound(describe(settings, account)))?;
        writeln!(out, "{}", BASE64.encode(bytes.as_slice()))?;
        return Ok(());
    }

    match store.get_string(account, &settings.service, group) {
        Ok(Some(value)) => {
            writeln!(out, "{}", value.as_str())?;
            Ok(())
        }
        Ok(None) => Err(KeystashError::NotFound(describe(settings, account))),
        Err(KeychainError::DecodeFailure) => {
            output::hint("The stored value is binary; use `keystash get --base64`.");
            Err(KeychainError::DecodeFailure.into())
        }
        Err(e) => Err(e.into()),
    }
}
