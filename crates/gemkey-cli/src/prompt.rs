//! Terminal passphrase provider.
//!
//! Entries are read without echo from the controlling terminal and held in
//! `SecretString` until the shared entry rules copy them into `SecureBytes`.

use gemkey_core::GemkeyResult;
use gemkey_secrets::{PassphraseMode, PassphraseProvider, PassphraseResponse};
use secrecy::{ExposeSecret, SecretString};

pub struct TerminalPrompt;

impl PassphraseProvider for TerminalPrompt {
    fn request(&self, mode: PassphraseMode) -> GemkeyResult<PassphraseResponse> {
        let first = match mode {
            PassphraseMode::Decrypt => read_hidden("Passphrase to decrypt the API key: ")?,
            PassphraseMode::EncryptConfirm => {
                read_hidden("Passphrase (will be used to encrypt the API key): ")?
            }
        };
        let confirmation = match mode {
            PassphraseMode::EncryptConfirm => Some(read_hidden("Confirm passphrase: ")?),
            PassphraseMode::Decrypt => None,
        };

        let response = PassphraseResponse::from_entries(
            mode,
            first.expose_secret().as_bytes(),
            confirmation.as_ref().map(|c| c.expose_secret().as_bytes()),
        )?;
        if response.is_cancelled() {
            eprintln!("Passphrase empty or not confirmed; aborting.");
        }
        Ok(response)
    }
}

/// Prompt on the terminal without echo.
pub fn read_hidden(prompt: &str) -> GemkeyResult<SecretString> {
    let entry = rpassword::prompt_password(prompt)?;
    Ok(SecretString::from(entry))
}
