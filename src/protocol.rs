//! Zero-knowledge password proof engine (SRP-6a)
//!
//! Stateless operations over explicit inputs; the engine keeps no session
//! state between calls, so unrelated sessions can use one instance
//! concurrently. Private ephemerals are parameters and never stored here —
//! callers that want the guided call sequence use the typed sessions in
//! [`crate::session`].
//!
//! Derivations, with `H` the digest parameter and `PAD(x)` the big-endian
//! encoding left-padded to the byte length of `N`:
//!
//! ```text
//! x  = H(salt | H(username ":" password))
//! v  = g^x mod N                        (stored verifier)
//! k  = H(N | PAD(g))
//! A  = g^a mod N
//! B  = (k*v + g^b) mod N
//! u  = H(PAD(A) | PAD(B))
//! S  = (B - k*g^x)^(a + u*x) mod N     (client)
//! S  = (A * v^u)^b mod N               (server)
//! K  = H(S)
//! M1 = H(username | salt | PAD(A) | PAD(B) | K)
//! M2 = H(PAD(A) | M1 | K)
//! ```

use std::marker::PhantomData;

use digest::Digest;
use generic_array::GenericArray;
use sha2::Sha256;

use crate::bigint::{random_bytes, ZkNum};
use crate::error::{Result, ZkError};
use crate::groups::{Strength, ZkGroup};

/// Session key `K = H(S)`, one digest output wide.
pub type SessionKey<D> = GenericArray<u8, <D as Digest>::OutputSize>;

/// Proof hash (`M1` from the client, `M2` from the server).
pub type SessionProof<D> = GenericArray<u8, <D as Digest>::OutputSize>;

/// Credential record produced at registration and persisted server-side,
/// keyed by username. Irreversible to the password without brute force; the
/// password itself is never stored.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Per-user random salt, sent to the client during the handshake.
    pub salt: Vec<u8>,
    /// `v = g^x mod N`; binds the server ephemeral to the password.
    pub verifier: ZkNum,
    /// Server-side key material consumed by session-key computation. Equals
    /// the verifier under SRP-6a; kept as a separate slot because the two
    /// are used at different protocol steps.
    pub key: ZkNum,
}

/// The protocol engine, bound to a parameter set and a digest.
///
/// The default instantiation uses SHA-256 over the 1024-bit group.
#[derive(Debug)]
pub struct ZkProtocol<D: Digest = Sha256> {
    group: &'static ZkGroup,
    d: PhantomData<D>,
}

impl ZkProtocol<Sha256> {
    pub fn new() -> Self {
        Self::with_strength(Strength::Bits1024)
    }
}

impl Default for ZkProtocol<Sha256> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> ZkProtocol<D> {
    pub fn with_strength(strength: Strength) -> Self {
        Self {
            group: ZkGroup::for_strength(strength),
            d: PhantomData,
        }
    }

    pub fn group(&self) -> &'static ZkGroup {
        self.group
    }

    /// Generates a credential record for a new user with a fresh 32-byte
    /// salt. Two calls for the same credentials produce unlinkable records.
    pub fn hash_credentials(&self, username: &str, password: &str) -> Result<CredentialRecord> {
        let salt = random_bytes(32)?;
        log::debug!("credential record generated ({} byte salt)", salt.len());
        Ok(self.hash_credentials_with_salt(username, password, salt))
    }

    /// Deterministic variant for an externally supplied salt (password
    /// change keeping the old salt, tests).
    pub fn hash_credentials_with_salt(
        &self,
        username: &str,
        password: &str,
        salt: Vec<u8>,
    ) -> CredentialRecord {
        let x = private_key::<D>(username, password, &salt);
        let v = self.group.g.modpow(&x, &self.group.n);
        CredentialRecord {
            salt,
            verifier: v.clone(),
            key: v,
        }
    }

    /// A record for a username that does not exist, backed by a random
    /// verifier. Running the handshake against it proceeds normally and
    /// fails at the proof check, so a remote observer cannot tell an
    /// unknown username from a wrong password.
    pub fn decoy_credentials(&self) -> Result<CredentialRecord> {
        let salt = random_bytes(32)?;
        let x = ZkNum::random(32)?;
        let v = self.group.g.modpow(&x, &self.group.n);
        Ok(CredentialRecord {
            salt,
            verifier: v.clone(),
            key: v,
        })
    }

    /// 256 bits from the OS CSPRNG, suitable as a private ephemeral
    /// exponent or as entropy for application payloads.
    pub fn crypt_rand(&self) -> Result<ZkNum> {
        ZkNum::random(32)
    }

    /// Client public ephemeral `A = g^a mod N`. The peer must reject a
    /// degenerate `A`; see [`server_compute_session_key`](Self::server_compute_session_key).
    pub fn get_client_ephemeral_a(&self, a: &ZkNum) -> ZkNum {
        self.group.g.modpow(a, &self.group.n)
    }

    /// Server public ephemeral `B = (k*v + g^b) mod N`, bound to the stored
    /// verifier so it cannot be forged without the credential record.
    pub fn get_server_ephemeral_b(&self, salt: &[u8], verifier: &ZkNum, b: &ZkNum) -> ZkNum {
        log::debug!("server ephemeral issued ({} byte salt)", salt.len());
        let n = &self.group.n;
        let k = self.group.compute_k::<D>();
        let kv = k.mod_mul(verifier, n);
        let gb = self.group.g.modpow(b, n);
        kv.mod_add(&gb, n)
    }

    /// Scramble `u = H(PAD(A) | PAD(B))`. Both peers compute it from the
    /// same exchanged pair and must agree bit for bit.
    pub fn calculate_random_scramble(&self, a_pub: &ZkNum, b_pub: &ZkNum) -> Result<ZkNum> {
        let len = self.group.n_len();
        let u = ZkNum::from_bytes_be(
            &D::new()
                .chain(&a_pub.to_padded_bytes_be(len))
                .chain(&b_pub.to_padded_bytes_be(len))
                .finalize(),
        );
        if u.is_zero() {
            return Err(ZkError::InvalidParameter("zero scramble"));
        }
        Ok(u)
    }

    /// Client-side session key: recomputes `x` from the password, strips the
    /// verifier term out of `B` and derives `K = H((B - k*g^x)^(a + u*x))`.
    ///
    /// The exponent `a + u*x` is taken exactly, without reduction mod `N`:
    /// for small groups `u*x` can exceed `N` and a premature reduction would
    /// desynchronize the two computational paths.
    pub fn client_compute_session_key(
        &self,
        salt: &[u8],
        username: &str,
        password: &str,
        a: &ZkNum,
        b_pub: &ZkNum,
        u: &ZkNum,
    ) -> Result<SessionKey<D>> {
        let n = &self.group.n;
        if b_pub.rem(n).is_zero() {
            return Err(ZkError::InvalidParameter("degenerate server ephemeral"));
        }

        let x = private_key::<D>(username, password, salt);
        let k = self.group.compute_k::<D>();
        let gx = self.group.g.modpow(&x, n);
        let kgx = k.mod_mul(&gx, n);
        // Because we operate modulo N, (k*v + g^b) mod N can be below k*g^x
        let base = b_pub.mod_sub(&kgx, n);
        let exp = a + &(u * &x);
        let s = base.modpow(&exp, n);
        Ok(D::digest(&s.to_bytes_be()))
    }

    /// Server-side session key `K = H((A * v^u)^b)` from the stored key
    /// material; equals the client's key iff the client knew the password.
    pub fn server_compute_session_key(
        &self,
        salt: &[u8],
        key: &ZkNum,
        a_pub: &ZkNum,
        b: &ZkNum,
        u: &ZkNum,
    ) -> Result<SessionKey<D>> {
        log::debug!("server session key derivation ({} byte salt)", salt.len());
        let n = &self.group.n;
        if a_pub.rem(n).is_zero() {
            return Err(ZkError::InvalidParameter("degenerate client ephemeral"));
        }

        let vu = key.modpow(u, n);
        let avu = a_pub.mod_mul(&vu, n);
        let s = avu.modpow(b, n);
        Ok(D::digest(&s.to_bytes_be()))
    }

    /// Client proof `M1 = H(username | salt | PAD(A) | PAD(B) | K)`, sent to
    /// the server as evidence of key knowledge.
    pub fn client_create_session_hash(
        &self,
        username: &str,
        salt: &[u8],
        a_pub: &ZkNum,
        b_pub: &ZkNum,
        key: &SessionKey<D>,
    ) -> SessionProof<D> {
        let len = self.group.n_len();
        D::new()
            .chain(username.as_bytes())
            .chain(salt)
            .chain(&a_pub.to_padded_bytes_be(len))
            .chain(&b_pub.to_padded_bytes_be(len))
            .chain(key)
            .finalize()
    }

    /// Server proof `M2 = H(PAD(A) | M1 | K)`; binding the client's own
    /// proof prevents it from being reflected back.
    pub fn server_create_session_hash(
        &self,
        a_pub: &ZkNum,
        client_proof: &SessionProof<D>,
        key: &SessionKey<D>,
    ) -> SessionProof<D> {
        let len = self.group.n_len();
        D::new()
            .chain(&a_pub.to_padded_bytes_be(len))
            .chain(client_proof)
            .chain(key)
            .finalize()
    }

    /// Deterministically concatenates byte sequences, e.g. to assemble a
    /// multi-block random payload. Not protocol-critical.
    pub fn combine(&self, parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }
}

/// Private key `x = H(salt | H(username ":" password))`
fn private_key<D: Digest>(username: &str, password: &str, salt: &[u8]) -> ZkNum {
    let inner = D::new()
        .chain(username.as_bytes())
        .chain(b":")
        .chain(password.as_bytes())
        .finalize();

    ZkNum::from_bytes_be(&D::new().chain(salt).chain(&inner).finalize())
}
