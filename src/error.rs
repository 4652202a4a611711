//! Error type for the protocol and session cipher

use thiserror::Error;

/// Errors produced by the handshake and the session cipher.
///
/// Both cryptographic-comparison failures display the same generic message,
/// so a remote caller reading surfaced errors or logs cannot tell a proof
/// mismatch from a decryption failure, nor which value was wrong.
#[derive(Debug, Error)]
pub enum ZkError {
    /// A degenerate protocol value was received (zero ephemeral, zero
    /// scramble). Fatal to the current handshake attempt; a retry requires a
    /// fresh session with fresh ephemerals.
    #[error("invalid protocol parameter: {0}")]
    InvalidParameter(&'static str),

    /// A proof hash did not match. Fatal to the session.
    #[error("authentication failure")]
    ProofMismatch,

    /// An authenticated payload failed its integrity check. Fatal to the
    /// message; never retried with a different key.
    #[error("authentication failure")]
    DecryptionFailure,

    /// The secure random source could not produce output. There is no
    /// fallback to a non-cryptographic source.
    #[error("secure random source unavailable")]
    RandomnessUnavailable,
}

pub type Result<T> = std::result::Result<T, ZkError>;
