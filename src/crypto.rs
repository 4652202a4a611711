//! Authenticated session cipher keyed from the handshake output
//!
//! Protects application payloads after the handshake. Integrity matters as
//! much as confidentiality here: the channel is already authenticated, so a
//! forged or bit-flipped payload must fail loudly rather than decrypt to
//! garbage.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::bigint::{random_bytes, ZkNum};
use crate::error::{Result, ZkError};
use crate::logger::ZkLogger;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Fixed per-message growth: prepended nonce plus authentication tag.
pub const OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Session cipher over ChaCha20-Poly1305, keyed with `SHA-256(K | u)` where
/// `K` is the agreed session key and `u` the scramble. One instance serves
/// the whole session; the derived key is zeroized on drop.
pub struct ZkCrypto {
    key: Zeroizing<Vec<u8>>,
    logger: Box<dyn ZkLogger>,
}

impl ZkCrypto {
    pub fn new(session_key: &[u8], scramble: &ZkNum, logger: Box<dyn ZkLogger>) -> Self {
        let key = Sha256::new()
            .chain(session_key)
            .chain(&scramble.to_bytes_be())
            .finalize();
        logger.debug("session cipher keyed");
        Self {
            key: Zeroizing::new(key.as_slice().to_vec()),
            logger,
        }
    }

    /// Encrypts under a fresh random nonce; two calls on the same plaintext
    /// never produce the same ciphertext. Output layout:
    /// `nonce | ciphertext | tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = random_bytes(NONCE_LEN)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| ZkError::InvalidParameter("payload not encryptable"))?;

        self.logger.debug(&format!(
            "encrypted {} bytes -> {} bytes",
            plaintext.len(),
            sealed.len() + NONCE_LEN
        ));

        let mut out = nonce;
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Decrypts and authenticates. Tampered, truncated, or foreign-key
    /// input fails with [`ZkError::DecryptionFailure`]; unauthenticated
    /// plaintext is never returned.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < OVERHEAD {
            self.logger.warn("ciphertext shorter than minimum frame");
            return Err(ZkError::DecryptionFailure);
        }
        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| {
                self.logger.warn("payload failed authentication");
                ZkError::DecryptionFailure
            })?;

        self.logger
            .debug(&format!("decrypted {} byte payload", plaintext.len()));
        Ok(plaintext)
    }
}
