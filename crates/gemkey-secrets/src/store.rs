//! Encrypted credential store: one secret, one container file.
//!
//! `put`: prompt (confirm) → salt, nonce → Argon2id → seal → encode →
//! write `<container>.tmp` → fsync → rename over the container.
//!
//! `get`: read → classify prefix → { legacy passthrough | decode → prompt →
//! Argon2id → open }.
//!
//! Passphrases, derived keys and plaintext live in `SecureBytes` /
//! `DerivedKey`, so every exit path (errors and cancels included) wipes them.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use gemkey_core::{GemkeyError, GemkeyResult, SecureBytes, MAX_SECRET_LEN};
use gemkey_crypto::{
    decode, derive_key, encode, generate_nonce, generate_salt, open, seal, AeadError, DecodeError,
};

use crate::passphrase::{PassphraseMode, PassphraseProvider, PassphraseResponse};
use crate::paths::StorePaths;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Where a returned secret was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Decrypted from an authenticated container.
    Container,
    /// Unframed bytes found at the container path (pre-encryption layout).
    LegacyAtEncryptedPath,
    /// The separate legacy plaintext file.
    LegacyPlainFile,
}

impl SecretSource {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Container => "encrypted container",
            Self::LegacyAtEncryptedPath => "legacy plaintext at container path",
            Self::LegacyPlainFile => "legacy plaintext file",
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, Self::Container)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored,
    Cancelled,
}

pub enum GetOutcome {
    Found {
        secret: SecureBytes,
        source: SecretSource,
    },
    /// No file at the container path.
    NotPresent,
    Cancelled,
}

/// Classification of the container path, obtained without prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Missing,
    Legacy { len: usize },
    Container { ciphertext_len: usize },
    Corrupt { len: usize },
}

pub struct CredentialStore {
    paths: StorePaths,
    provider: Arc<dyn PassphraseProvider>,
}

impl CredentialStore {
    pub fn new(paths: StorePaths, provider: Arc<dyn PassphraseProvider>) -> Self {
        Self { paths, provider }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Encrypt `plaintext` under a freshly confirmed passphrase and replace
    /// the container atomically.
    ///
    /// Nothing touches the disk when the prompt is cancelled or derivation
    /// fails. A failure before the rename leaves the previous container as is.
    ///
    /// Concurrent `put`s share the temp path `api_key.enc.tmp`; while one is
    /// writing, another fails with `Storage(AlreadyExists)`. A temp file left
    /// behind by a killed process blocks `put` until it is removed.
    pub fn put(&self, plaintext: &[u8]) -> GemkeyResult<PutOutcome> {
        if plaintext.is_empty() || plaintext.len() > MAX_SECRET_LEN {
            return Err(GemkeyError::InvalidSecret {
                len: plaintext.len(),
                max: MAX_SECRET_LEN,
            });
        }

        let Some(passphrase) = self.request_passphrase(PassphraseMode::EncryptConfirm)? else {
            tracing::debug!("passphrase entry cancelled, container left untouched");
            return Ok(PutOutcome::Cancelled);
        };

        let salt = generate_salt();
        let nonce = generate_nonce();
        let key = derive_key(&passphrase, &salt)?;
        drop(passphrase);

        let ciphertext = seal(&key, &nonce, plaintext).map_err(aead_error)?;
        drop(key);

        let blob = encode(&salt, &nonce, &ciphertext);
        self.ensure_app_dir()?;
        write_then_rename(&self.paths.temp_path(), &self.paths.encrypted_path(), &blob)?;

        tracing::debug!(
            path = %self.paths.encrypted_path().display(),
            bytes = blob.len(),
            "stored credential container"
        );
        Ok(PutOutcome::Stored)
    }

    /// Read the container and return the secret it holds.
    ///
    /// A file without the magic is returned verbatim as a legacy key; a file
    /// with the magic must authenticate or the call fails.
    pub fn get(&self) -> GemkeyResult<GetOutcome> {
        let path = self.paths.encrypted_path();
        let Some(raw) = read_optional(&path)? else {
            return Ok(GetOutcome::NotPresent);
        };

        let container = match decode(raw.expose_secret()) {
            Ok(container) => container,
            Err(DecodeError::NotAContainer) => {
                tracing::warn!(
                    path = %path.display(),
                    "credential file has no container magic, treating it as a legacy plaintext key"
                );
                return Ok(GetOutcome::Found {
                    secret: raw,
                    source: SecretSource::LegacyAtEncryptedPath,
                });
            }
            Err(DecodeError::Truncated) => {
                tracing::debug!(path = %path.display(), bytes = raw.len(), "credential container truncated");
                return Err(GemkeyError::Corrupt);
            }
        };

        let Some(passphrase) = self.request_passphrase(PassphraseMode::Decrypt)? else {
            return Ok(GetOutcome::Cancelled);
        };

        let key = derive_key(&passphrase, container.salt)?;
        drop(passphrase);

        let secret = open(&key, container.nonce, container.ciphertext).map_err(aead_error)?;

        tracing::debug!(path = %path.display(), "opened credential container");
        Ok(GetOutcome::Found {
            secret,
            source: SecretSource::Container,
        })
    }

    /// Classify the file at the container path without asking for a passphrase.
    pub fn inspect(&self) -> GemkeyResult<ContainerStatus> {
        let Some(raw) = read_optional(&self.paths.encrypted_path())? else {
            return Ok(ContainerStatus::Missing);
        };
        Ok(match decode(raw.expose_secret()) {
            Ok(container) => ContainerStatus::Container {
                ciphertext_len: container.ciphertext.len(),
            },
            Err(DecodeError::NotAContainer) => ContainerStatus::Legacy { len: raw.len() },
            Err(DecodeError::Truncated) => ContainerStatus::Corrupt { len: raw.len() },
        })
    }

    /// Ask the provider, folding an empty `Given` into a cancel.
    fn request_passphrase(&self, mode: PassphraseMode) -> GemkeyResult<Option<SecureBytes>> {
        match self.provider.request(mode)? {
            PassphraseResponse::Given(passphrase) if !passphrase.is_empty() => Ok(Some(passphrase)),
            PassphraseResponse::Given(_) | PassphraseResponse::Cancelled => Ok(None),
        }
    }

    /// Create the app directory if needed and force it to owner-only access.
    fn ensure_app_dir(&self) -> GemkeyResult<()> {
        let dir = self.paths.app_dir();
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIR_MODE);
        }
        builder.create(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir)?.permissions().mode() & 0o777;
            if mode != DIR_MODE {
                tracing::warn!(
                    path = %dir.display(),
                    mode = %format!("{mode:o}"),
                    "restricting credential directory to 0700"
                );
                fs::set_permissions(dir, fs::Permissions::from_mode(DIR_MODE))?;
            }
        }
        Ok(())
    }
}

fn aead_error(err: AeadError) -> GemkeyError {
    match err {
        AeadError::Seal => GemkeyError::Encryption,
        AeadError::AuthFailure => GemkeyError::BadPassphraseOrCorrupt,
    }
}

/// Read a whole file into wiped-on-drop memory; `None` when it does not exist.
fn read_optional(path: &Path) -> GemkeyResult<Option<SecureBytes>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(SecureBytes::from_vec(bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `blob` to `tmp`, then rename it over `target`.
///
/// `tmp` doubles as a writer lock: it is created exclusively, so a second
/// writer fails with `AlreadyExists` instead of truncating a file that may
/// already have been renamed into place. Only a temp file created by this
/// call is ever removed.
fn write_then_rename(tmp: &Path, target: &Path, blob: &[u8]) -> std::io::Result<()> {
    let file = create_exclusive(tmp)?;
    if let Err(e) = write_synced(file, blob).and_then(|()| fs::rename(tmp, target)) {
        let _ = fs::remove_file(tmp);
        return Err(e);
    }
    if let Some(parent) = target.parent() {
        sync_dir_best_effort(parent);
    }
    Ok(())
}

fn create_exclusive(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            std::io::Error::new(
                e.kind(),
                format!(
                    "{} exists: another write is in progress, or an earlier one was \
                     interrupted (remove the file to continue)",
                    path.display()
                ),
            )
        } else {
            e
        }
    })
}

fn write_synced(mut file: fs::File, blob: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(FILE_MODE))?;
    }
    file.write_all(blob)?;
    file.sync_all()
}

/// Persist the rename itself. Not every platform can open a directory.
fn sync_dir_best_effort(dir: &Path) {
    if let Ok(handle) = fs::File::open(dir) {
        if let Err(e) = handle.sync_all() {
            tracing::debug!(path = %dir.display(), "directory fsync skipped: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static [u8]);

    impl PassphraseProvider for Fixed {
        fn request(&self, _mode: PassphraseMode) -> GemkeyResult<PassphraseResponse> {
            Ok(PassphraseResponse::Given(SecureBytes::try_from_slice(self.0)?))
        }
    }

    fn store_in(dir: &Path, passphrase: &'static [u8]) -> CredentialStore {
        CredentialStore::new(StorePaths::from_config_root(dir), Arc::new(Fixed(passphrase)))
    }

    #[test]
    fn test_put_rejects_empty_and_oversized_secrets() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), b"pw");

        assert!(matches!(
            store.put(b""),
            Err(GemkeyError::InvalidSecret { len: 0, .. })
        ));
        let huge = vec![b'x'; MAX_SECRET_LEN + 1];
        assert!(matches!(
            store.put(&huge),
            Err(GemkeyError::InvalidSecret { .. })
        ));
        assert!(!store.paths().app_dir().exists(), "nothing may be written");
    }

    #[test]
    fn test_empty_given_is_treated_as_cancel() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), b"");

        assert_eq!(store.put(b"secret").unwrap(), PutOutcome::Cancelled);
        assert!(!store.paths().encrypted_path().exists());
    }

    #[test]
    fn test_inspect_classifies_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), b"pw");
        assert_eq!(store.inspect().unwrap(), ContainerStatus::Missing);

        fs::create_dir_all(store.paths().app_dir()).unwrap();
        fs::write(store.paths().encrypted_path(), b"AIza-plain-legacy").unwrap();
        assert_eq!(store.inspect().unwrap(), ContainerStatus::Legacy { len: 17 });

        fs::write(store.paths().encrypted_path(), b"GEMINIENC1short").unwrap();
        assert_eq!(store.inspect().unwrap(), ContainerStatus::Corrupt { len: 15 });

        store.put(b"A").unwrap();
        assert_eq!(
            store.inspect().unwrap(),
            ContainerStatus::Container { ciphertext_len: 1 + 16 }
        );
    }

    #[test]
    fn test_failed_write_keeps_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("target");
        fs::write(&target, b"previous").unwrap();
        // A directory at the temp path makes the open fail.
        let temp = tmp.path().join("target.tmp");
        fs::create_dir(&temp).unwrap();

        let result = write_then_rename(&temp, &target, b"new");

        assert!(result.is_err());
        assert_eq!(fs::read(&target).unwrap(), b"previous");
        assert!(temp.is_dir(), "a temp path this call did not create stays");
    }

    #[test]
    fn test_existing_temp_file_is_neither_truncated_nor_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("target");
        fs::write(&target, b"previous").unwrap();
        let temp = tmp.path().join("target.tmp");
        fs::write(&temp, b"other writer").unwrap();

        let err = write_then_rename(&temp, &target, b"new").unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert!(err.to_string().contains("target.tmp"));
        assert_eq!(fs::read(&temp).unwrap(), b"other writer");
        assert_eq!(fs::read(&target).unwrap(), b"previous");
    }

    #[test]
    fn test_aead_errors_map_to_distinct_kinds() {
        assert!(matches!(aead_error(AeadError::Seal), GemkeyError::Encryption));
        assert!(matches!(
            aead_error(AeadError::AuthFailure),
            GemkeyError::BadPassphraseOrCorrupt
        ));
    }

    #[test]
    fn test_secret_source_descriptions() {
        assert!(!SecretSource::Container.is_legacy());
        assert!(SecretSource::LegacyPlainFile.is_legacy());
        assert_eq!(SecretSource::Container.describe(), "encrypted container");
    }
}
