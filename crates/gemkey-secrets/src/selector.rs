//! "Give me the current API key": container first, then the legacy file.

use std::fs;

use gemkey_core::{GemkeyResult, SecureBytes};

use crate::store::{CredentialStore, GetOutcome, SecretSource};

pub enum Resolution {
    Found {
        secret: SecureBytes,
        source: SecretSource,
    },
    /// The user backed out of the passphrase prompt.
    Cancelled,
    /// Neither the container nor a non-empty legacy file exists.
    NotAvailable,
}

/// Resolve the current secret.
///
///   1. `store.get()`: `Found` and `Cancelled` are final, errors propagate.
///   2. Only on `NotPresent`: the legacy plaintext file, if non-empty.
///   3. Otherwise `NotAvailable`.
pub fn resolve_secret(store: &CredentialStore) -> GemkeyResult<Resolution> {
    match store.get()? {
        GetOutcome::Found { secret, source } => return Ok(Resolution::Found { secret, source }),
        GetOutcome::Cancelled => return Ok(Resolution::Cancelled),
        GetOutcome::NotPresent => {}
    }

    let legacy_path = store.paths().legacy_plain_path();
    let bytes = match fs::read(&legacy_path) {
        Ok(bytes) => SecureBytes::from_vec(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no stored API key found");
            return Ok(Resolution::NotAvailable);
        }
        Err(e) => return Err(e.into()),
    };

    if bytes.is_empty() {
        tracing::debug!(path = %legacy_path.display(), "legacy key file is empty");
        return Ok(Resolution::NotAvailable);
    }

    tracing::debug!(path = %legacy_path.display(), "using legacy plaintext key file");
    Ok(Resolution::Found {
        secret: bytes,
        source: SecretSource::LegacyPlainFile,
    })
}
