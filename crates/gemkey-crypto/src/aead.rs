//! XChaCha20-Poly1305 sealing of the stored secret
//!
//! No associated data: the container has a single record and nothing to bind
//! it to. The 192-bit nonce is random per seal.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use gemkey_core::SecureBytes;
use rand::{rngs::OsRng, RngCore};

use crate::error::AeadError;
use crate::kdf::DerivedKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Sample a fresh nonce from the operating system RNG.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext`. Returns `ciphertext || tag`.
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, AeadError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|_| AeadError::Seal)?;
    debug_assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);
    Ok(ciphertext)
}

/// Authenticate and decrypt `ciphertext || tag`.
///
/// The plaintext only exists once the tag has verified; on failure nothing
/// is returned.
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<SecureBytes, AeadError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(AeadError::AuthFailure);
    }
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map(SecureBytes::from_vec)
        .map_err(|_| AeadError::AuthFailure)
}
