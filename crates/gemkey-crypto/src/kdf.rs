//! Key derivation: Argon2id passphrase → container key
//!
//! The cost profile is fixed policy and is not stored in the container.
//! It equals libsodium's `crypto_pwhash` interactive limits (64 MiB, 2 passes,
//! one lane, Argon2id v1.3), so containers written by libsodium-based builds
//! open here unchanged.

use argon2::{Algorithm, Argon2, Block, Params, Version};
use gemkey_core::{GemkeyError, GemkeyResult, SecureBytes};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::{KEY_SIZE, SALT_SIZE};

/// Interactive profile memory cost in KiB (64 MiB)
pub const INTERACTIVE_MEM_COST_KIB: u32 = 65536;
/// Interactive profile time cost (passes)
pub const INTERACTIVE_TIME_COST: u32 = 2;
/// Interactive profile parallelism (lanes)
pub const INTERACTIVE_PARALLELISM: u32 = 1;

/// A 256-bit key derived from a passphrase. Zeroized on drop.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Zeroize for DerivedKey {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Sample a fresh salt from the operating system RNG.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

fn interactive_params() -> GemkeyResult<Params> {
    Params::new(
        INTERACTIVE_MEM_COST_KIB,
        INTERACTIVE_TIME_COST,
        INTERACTIVE_PARALLELISM,
        Some(KEY_SIZE),
    )
    .map_err(|e| GemkeyError::DerivationResourceExhausted(format!("invalid Argon2id params: {e}")))
}

/// Derive the container key from `passphrase` and `salt`.
///
/// The 64 MiB working area is reserved up front; if the allocator refuses,
/// this returns `DerivationResourceExhausted` rather than aborting. The area
/// is zeroed before release on every path: the key is a hash of its last block.
pub fn derive_key(passphrase: &SecureBytes, salt: &[u8; SALT_SIZE]) -> GemkeyResult<DerivedKey> {
    let params = interactive_params()?;
    let block_count = params.block_count();
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut memory: Zeroizing<Vec<Block>> = Zeroizing::new(Vec::new());
    memory.try_reserve_exact(block_count).map_err(|_| {
        GemkeyError::DerivationResourceExhausted(format!(
            "cannot reserve {} KiB for Argon2id",
            INTERACTIVE_MEM_COST_KIB
        ))
    })?;
    memory.resize(block_count, Block::default());

    let mut key = DerivedKey::from_bytes([0u8; KEY_SIZE]);
    argon2
        .hash_password_into_with_memory(
            passphrase.expose_secret(),
            salt,
            &mut key.bytes,
            memory.as_mut_slice(),
        )
        .map_err(|e| GemkeyError::DerivationResourceExhausted(format!("Argon2id KDF failed: {e}")))?;

    tracing::trace!(blocks = block_count, "derived container key");
    Ok(key)
}
