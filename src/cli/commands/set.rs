//! `keystash set`: store a secret, replacing any existing one.

use std::ffi::OsStr;
use std::io::{self, IsTerminal, Read};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::Zeroizing;

use crate::backend::ItemStore;
use crate::cli::output;
use crate::cli::{describe, load_settings, open_store, value_to_string, Cli};
use crate::config::Settings;
use crate::errors::{KeystashError, Result};
use crate::keychain::CredentialStore;

/// Execute the `set` command.
pub fn execute(cli: &Cli, account: &str, value: Option<&OsStr>, base64: bool) -> Result<()> {
    let settings = load_settings(cli)?;

    // Determine the secret value from one of three sources.
    let text = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line; it may appear in shell history.");
        Zeroizing::new(value_to_string(v)?)
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        buf
    } else {
        // Source 3: Interactive secure prompt (default).
        let entered = dialoguer::Password::new()
            .with_prompt(format!("Enter secret for {account}"))
            .interact()
            .map_err(|e| KeystashError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(entered)
    };

    let payload = decode_payload(&text, base64)?;
    let store = open_store(&settings);
    run(&store, &settings, account, &payload)?;
    Ok(())
}

/// Turn the entered text into the bytes to store.
fn decode_payload(text: &str, base64: bool) -> Result<Zeroizing<Vec<u8>>> {
    if !base64 {
        return Ok(Zeroizing::new(text.as_bytes().to_vec()));
    }
    BASE64
        .decode(text.trim())
        .map(Zeroizing::new)
        .map_err(|e| KeystashError::CommandFailed(format!("value is not valid base64: {e}")))
}

/// Store `payload` for `account`.  Returns `true` when an existing item was
/// replaced.
pub fn run<S: ItemStore>(
    store: &CredentialStore<S>,
    settings: &Settings,
    account: &str,
    payload: &[u8],
) -> Result<bool> {
    let group = settings.access_group.as_deref();

    let existed = store.exists(account, &settings.service, group)?;
    store.set_data(payload, account, &settings.service, group, None)?;

    let verb = if existed { "Updated" } else { "Stored" };
    output::success(&format!("{verb} secret for {}", describe(settings, account)));
    Ok(existed)
}
