//! Heap byte buffer that is wiped before its memory is released.
//!
//! Holds passphrases and decrypted secrets. There is deliberately no `Debug`,
//! `Clone` or `PartialEq`: the only way at the contents is a scoped borrow
//! through [`SecureBytes::expose_secret`].

use zeroize::Zeroize;

use crate::error::{GemkeyError, GemkeyResult};

pub struct SecureBytes {
    bytes: Vec<u8>,
}

impl SecureBytes {
    /// Copy `data` into a freshly reserved buffer.
    ///
    /// Reports `Allocation` instead of aborting when the reservation fails.
    pub fn try_from_slice(data: &[u8]) -> GemkeyResult<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(data.len())
            .map_err(|_| GemkeyError::Allocation(data.len()))?;
        bytes.extend_from_slice(data);
        Ok(Self { bytes })
    }

    /// Take ownership of an existing buffer without copying it.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn expose_secret(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Overwrite the whole allocation (spare capacity included) with zeros.
    /// The allocation itself is kept until drop.
    fn wipe(&mut self) {
        self.bytes.zeroize();
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.wipe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_slice_copies() {
        let secret = SecureBytes::try_from_slice(b"hunter2").unwrap();
        assert_eq!(secret.expose_secret(), b"hunter2");
        assert_eq!(secret.len(), 7);
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_from_vec_keeps_contents() {
        let secret = SecureBytes::from(vec![1u8, 2, 3]);
        assert_eq!(secret.expose_secret(), &[1, 2, 3]);
    }

    #[test]
    fn test_empty_buffer() {
        let secret = SecureBytes::try_from_slice(b"").unwrap();
        assert!(secret.is_empty());
    }

    #[test]
    fn test_wipe_zeroes_backing_storage() {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(b"AIzaSyExampleExampleExampleExample123");
        let mut secret = SecureBytes::from_vec(data);

        let ptr = secret.bytes.as_ptr();
        let capacity = secret.bytes.capacity();
        secret.wipe();

        // The allocation is still owned by `secret`, so reading it is sound.
        let backing = unsafe { std::slice::from_raw_parts(ptr, capacity) };
        assert!(backing.iter().all(|&b| b == 0), "buffer must be zeroed");
        assert_eq!(secret.bytes.capacity(), capacity);
        assert!(secret.is_empty());
    }
}
