//! `keystash delete`: remove a stored secret.

use dialoguer::Confirm;

use crate::backend::ItemStore;
use crate::cli::output;
use crate::cli::{describe, load_settings, open_store, Cli};
use crate::config::Settings;
use crate::errors::{KeychainError, KeystashError, Result};
use crate::keychain::CredentialStore;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, account: &str, force: bool, ignore_missing: bool) -> Result<()> {
    let settings = load_settings(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret {}?", describe(&settings, account)))
            .default(false)
            .interact()
            .map_err(|e| KeystashError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Err(KeystashError::UserCancelled);
        }
    }

    let store = open_store(&settings);
    run(&store, &settings, account, ignore_missing)
}

/// Delete the secret for `account`.  With `ignore_missing`, an absent item
/// counts as success.
pub fn run<S: ItemStore>(
    store: &CredentialStore<S>,
    settings: &Settings,
    account: &str,
    ignore_missing: bool,
) -> Result<()> {
    let name = describe(settings, account);
    match store.delete(account, &settings.service, settings.access_group.as_deref()) {
        Ok(()) => {
            output::success(&format!("Deleted secret {name}"));
            Ok(())
        }
        Err(KeychainError::ItemNotFound) if ignore_missing => {
            output::info(&format!("Nothing stored for {name}"));
            Ok(())
        }
        Err(KeychainError::ItemNotFound) => Err(KeystashError::NotFound(name)),
        Err(e) => Err(e.into()),
    }
}
