use thiserror::Error;

pub type GemkeyResult<T> = Result<T, GemkeyError>;

/// Failures surfaced at the credential store boundary.
///
/// Expected user outcomes (cancelled prompt, nothing stored) are not errors;
/// they are variants of the operation results instead.
#[derive(Debug, Error)]
pub enum GemkeyError {
    #[error("credential container is truncated or malformed")]
    Corrupt,

    #[error("incorrect passphrase or corrupted credential container")]
    BadPassphraseOrCorrupt,

    #[error("key derivation could not obtain its working memory: {0}")]
    DerivationResourceExhausted(String),

    #[error("could not seal the credential container")]
    Encryption,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("no user configuration directory could be resolved")]
    ConfigRootMissing,

    #[error("secret must be between 1 and {max} bytes, got {len}")]
    InvalidSecret { len: usize, max: usize },

    #[error("could not allocate {0} bytes of secure memory")]
    Allocation(usize),

    #[error("config error: {0}")]
    Config(String),
}

impl GemkeyError {
    /// True for the integrity class: the stored data cannot be trusted.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Corrupt | Self::BadPassphraseOrCorrupt)
    }
}
