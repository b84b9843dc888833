//! gemkey-secrets: passphrase-protected storage for the Gemini API key
//!
//! Resolution chain used by [`resolve_secret`] (first hit wins):
//!   1. `<config>/gemini-gtk/api_key.enc`, an authenticated container
//!      (or, without the magic, a legacy plaintext key at that path)
//!   2. `<config>/gemini-gtk/api_key.txt`, the legacy plaintext file
//!
//! A cancelled passphrase prompt stops the chain; it never falls through to
//! the legacy file.

pub mod passphrase;
pub mod paths;
pub mod selector;
pub mod store;

pub use passphrase::{PassphraseMode, PassphraseProvider, PassphraseResponse};
pub use paths::StorePaths;
pub use selector::{resolve_secret, Resolution};
pub use store::{ContainerStatus, CredentialStore, GetOutcome, PutOutcome, SecretSource};
