//! Passphrase source contract.
//!
//! The store never talks to a user directly. Whatever front-end is in use
//! (terminal, dialog, test script) implements [`PassphraseProvider`] and is
//! handed to the store at construction.

use gemkey_core::{GemkeyResult, SecureBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseMode {
    /// Single entry, used to open an existing container.
    Decrypt,
    /// Two entries that must match, used before writing a container.
    EncryptConfirm,
}

pub enum PassphraseResponse {
    Given(SecureBytes),
    Cancelled,
}

impl PassphraseResponse {
    /// Apply the entry rules shared by every provider.
    ///
    /// - `Decrypt`: any non-empty `first` is accepted; `confirmation` is ignored.
    /// - `EncryptConfirm`: `first` must be non-empty and byte-identical to
    ///   `confirmation`; a missing confirmation is a cancel.
    pub fn from_entries(
        mode: PassphraseMode,
        first: &[u8],
        confirmation: Option<&[u8]>,
    ) -> GemkeyResult<Self> {
        if first.is_empty() {
            return Ok(Self::Cancelled);
        }
        if mode == PassphraseMode::EncryptConfirm && confirmation != Some(first) {
            tracing::debug!("passphrase confirmation did not match");
            return Ok(Self::Cancelled);
        }
        Ok(Self::Given(SecureBytes::try_from_slice(first)?))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Source of passphrases for the credential store.
///
/// `request` may block for as long as the user takes. Returning an error
/// means the input device itself failed; a user backing out is `Cancelled`.
pub trait PassphraseProvider: Send + Sync {
    fn request(&self, mode: PassphraseMode) -> GemkeyResult<PassphraseResponse>;
}
