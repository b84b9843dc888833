//! gemkey-crypto: the primitives behind the encrypted credential container
//!
//! On-disk layout (all sizes fixed, no length prefixes):
//! ```text
//! [10 bytes: "GEMINIENC1"][16 bytes: salt][24 bytes: nonce][N bytes: ciphertext][16 bytes: tag]
//! ```
//!
//! Key schedule:
//! ```text
//! passphrase ──Argon2id(salt, interactive profile)──▶ 256-bit key
//!   └── XChaCha20-Poly1305(key, nonce, no AAD) over the secret
//! ```

pub mod aead;
pub mod container;
pub mod error;
pub mod kdf;

pub use aead::{generate_nonce, open, seal};
pub use container::{decode, encode, has_magic, Container, MAGIC};
pub use error::{AeadError, DecodeError};
pub use kdf::{derive_key, generate_salt, DerivedKey};

/// Size of the derived symmetric key (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the Argon2id salt
pub const SALT_SIZE: usize = 16;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;
