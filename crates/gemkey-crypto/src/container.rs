//! Container codec: fixed-offset framing, no crypto and no I/O.
//!
//! | Offset | Length | Field |
//! |---|---|---|
//! | 0  | 10 | magic `GEMINIENC1` |
//! | 10 | 16 | salt |
//! | 26 | 24 | nonce |
//! | 50 | n  | ciphertext + 16-byte tag (n ≥ 16) |
//!
//! Any change to the layout or to the KDF policy requires a new magic.

use crate::error::DecodeError;
use crate::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Format tag of the current container version.
pub const MAGIC: &[u8; 10] = b"GEMINIENC1";

/// Bytes before the ciphertext: magic + salt + nonce.
pub const HEADER_SIZE: usize = MAGIC.len() + SALT_SIZE + NONCE_SIZE;

/// Smallest well-formed container (header + bare tag).
pub const MIN_CONTAINER_SIZE: usize = HEADER_SIZE + TAG_SIZE;

/// Borrowed view of a decoded container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
    pub salt: &'a [u8; SALT_SIZE],
    pub nonce: &'a [u8; NONCE_SIZE],
    /// Ciphertext with the Poly1305 tag appended.
    pub ciphertext: &'a [u8],
}

/// Concatenate magic, salt, nonce and ciphertext.
pub fn encode(salt: &[u8; SALT_SIZE], nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    blob.extend_from_slice(MAGIC);
    blob.extend_from_slice(salt);
    blob.extend_from_slice(nonce);
    blob.extend_from_slice(ciphertext);
    debug_assert_eq!(blob.len(), HEADER_SIZE + ciphertext.len());
    blob
}

/// True when `bytes` starts with the container magic.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

/// Split `bytes` into salt, nonce and ciphertext.
///
/// Short input is checked before the magic, so a 5-byte file is `Truncated`
/// rather than `NotAContainer`.
pub fn decode(bytes: &[u8]) -> Result<Container<'_>, DecodeError> {
    if bytes.len() < MAGIC.len() {
        return Err(DecodeError::Truncated);
    }
    let rest = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or(DecodeError::NotAContainer)?;
    if bytes.len() < MIN_CONTAINER_SIZE {
        return Err(DecodeError::Truncated);
    }

    let (salt, rest) = rest
        .split_first_chunk::<SALT_SIZE>()
        .ok_or(DecodeError::Truncated)?;
    let (nonce, ciphertext) = rest
        .split_first_chunk::<NONCE_SIZE>()
        .ok_or(DecodeError::Truncated)?;

    Ok(Container {
        salt,
        nonce,
        ciphertext,
    })
}
