//! Arbitrary-precision integer used for all protocol math
//!
//! Every protocol quantity (ephemerals, verifier, scramble, shared secret)
//! is a non-negative [`ZkNum`]. Values round-trip exactly through canonical
//! big-endian byte encoding, and anything derived from a secret is compared
//! through [`ZkNum::ct_eq`] / [`ct_eq_bytes`] rather than `==`.

use std::ops::{Add, Mul};

use num_bigint::BigUint;
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

use crate::error::{Result, ZkError};

/// Non-negative arbitrary-precision integer.
///
/// `PartialEq` compares values of differing encoded lengths correctly
/// (`0x0007 == 0x07`) and is fine for non-secret cross-checks; use
/// [`ZkNum::ct_eq`] wherever an operand is secret-derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZkNum(BigUint);

impl ZkNum {
    /// Builds a value from a big-endian byte sequence of arbitrary length.
    /// An empty slice is zero; leading zero bytes are ignored.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    pub fn from_u32(v: u32) -> Self {
        Self(BigUint::from(v))
    }

    /// Canonical minimal big-endian encoding. Zero encodes as a single
    /// `0x00` byte.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }

    /// Big-endian encoding left-padded with zero bytes to `len`. Returns the
    /// minimal encoding unchanged when it is already `len` bytes or longer.
    pub fn to_padded_bytes_be(&self, len: usize) -> Vec<u8> {
        let bytes = self.0.to_bytes_be();
        if bytes.len() >= len {
            return bytes;
        }
        let mut buf = vec![0u8; len];
        buf[len - bytes.len()..].copy_from_slice(&bytes);
        buf
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    /// Bit length of the value (0 for zero).
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// `self ^ exp mod modulus` via the windowed exponentiation in
    /// `num-bigint`, fast enough for full-strength moduli.
    pub fn modpow(&self, exp: &ZkNum, modulus: &ZkNum) -> ZkNum {
        Self(self.0.modpow(&exp.0, &modulus.0))
    }

    pub fn rem(&self, modulus: &ZkNum) -> ZkNum {
        Self(&self.0 % &modulus.0)
    }

    pub fn mod_add(&self, other: &ZkNum, modulus: &ZkNum) -> ZkNum {
        Self((&self.0 + &other.0) % &modulus.0)
    }

    pub fn mod_mul(&self, other: &ZkNum, modulus: &ZkNum) -> ZkNum {
        Self((&self.0 * &other.0) % &modulus.0)
    }

    /// `self - other mod modulus`, wrapping through the modulus when
    /// `other > self`. Because protocol values are reduced, a plain
    /// subtraction could underflow: `(kv + g^b) mod N` may be smaller
    /// than `kv`.
    pub fn mod_sub(&self, other: &ZkNum, modulus: &ZkNum) -> ZkNum {
        let rhs = &other.0 % &modulus.0;
        if self.0 >= rhs {
            Self((&self.0 - &rhs) % &modulus.0)
        } else {
            Self((&modulus.0 + &self.0 - &rhs) % &modulus.0)
        }
    }

    /// Uniformly random value of `len` bytes from the operating system
    /// CSPRNG. Fails with [`ZkError::RandomnessUnavailable`] when the source
    /// cannot deliver; there is deliberately no weaker fallback.
    pub fn random(len: usize) -> Result<ZkNum> {
        let mut buf = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| ZkError::RandomnessUnavailable)?;
        Ok(Self::from_bytes_be(&buf))
    }

    /// Uniformly random value in `[1, limit - 1]`, by rejection sampling at
    /// the byte length of `limit`.
    pub fn random_below(limit: &ZkNum) -> Result<ZkNum> {
        let len = ((limit.0.bits() + 7) / 8) as usize;
        loop {
            let candidate = Self::random(len)?;
            if !candidate.is_zero() && candidate.0 < limit.0 {
                return Ok(candidate);
            }
        }
    }

    /// Constant-time equality for secret-derived values. Both operands are
    /// padded to a common length so the comparison cost does not depend on
    /// where a mismatch occurs.
    pub fn ct_eq(&self, other: &ZkNum) -> bool {
        let a = self.to_bytes_be();
        let b = other.to_bytes_be();
        let len = a.len().max(b.len());
        let mut pa = vec![0u8; len];
        pa[len - a.len()..].copy_from_slice(&a);
        let mut pb = vec![0u8; len];
        pb[len - b.len()..].copy_from_slice(&b);
        bool::from(pa.ct_eq(&pb[..]))
    }
}

/// Random bytes straight from the operating system CSPRNG, for salts and
/// cipher nonces.
pub(crate) fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| ZkError::RandomnessUnavailable)?;
    Ok(buf)
}

/// Constant-time byte comparison for proof hashes and session keys.
/// Differing lengths compare unequal without a data-dependent early exit.
pub fn ct_eq_bytes(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> bool {
    let (a, b) = (a.as_ref(), b.as_ref());
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}

impl Add<&ZkNum> for &ZkNum {
    type Output = ZkNum;

    fn add(self, rhs: &ZkNum) -> ZkNum {
        ZkNum(&self.0 + &rhs.0)
    }
}

impl Mul<&ZkNum> for &ZkNum {
    type Output = ZkNum;

    fn mul(self, rhs: &ZkNum) -> ZkNum {
        ZkNum(&self.0 * &rhs.0)
    }
}
