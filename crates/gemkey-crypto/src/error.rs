use thiserror::Error;

/// Why a byte string could not be split into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The magic tag is absent; the bytes may be a legacy plaintext key.
    #[error("data does not start with the container magic")]
    NotAContainer,

    #[error("container is shorter than its fixed header plus tag")]
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AeadError {
    #[error("encryption failed")]
    Seal,

    /// Tag mismatch. Wrong key and tampered data look the same.
    #[error("authentication failed")]
    AuthFailure,
}
