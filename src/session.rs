//! Typed handshake state machines for the two peers
//!
//! Each step consumes the previous state, so a private ephemeral can never
//! be reused across attempts and a failed handshake has no retry path short
//! of starting over with fresh randoms. The terminal states are
//! [`EstablishedSession`] and the `Err` return.
//!
//! ```text
//! client: ClientSession --(salt, B)--> ClientAwaitingProof --(M2)--> EstablishedSession
//! server: ServerSession --(M1)------------------------------------> EstablishedSession
//! ```

use digest::Digest;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::bigint::{ct_eq_bytes, ZkNum};
use crate::crypto::ZkCrypto;
use crate::error::{Result, ZkError};
use crate::groups::Strength;
use crate::logger::ZkLogger;
use crate::protocol::{CredentialRecord, SessionKey, SessionProof, ZkProtocol};

/// Client side before the server has replied. Owns the private ephemeral
/// `a`; sends `(username, A)` to the server.
pub struct ClientSession<D: Digest = Sha256> {
    proto: ZkProtocol<D>,
    username: String,
    password: Zeroizing<String>,
    a: ZkNum,
    a_pub: ZkNum,
}

impl ClientSession<Sha256> {
    pub fn start(username: &str, password: &str) -> Result<Self> {
        Self::with_strength(Strength::Bits1024, username, password)
    }
}

impl<D: Digest> ClientSession<D> {
    pub fn with_strength(strength: Strength, username: &str, password: &str) -> Result<Self> {
        let proto = ZkProtocol::with_strength(strength);
        let a = proto.crypt_rand()?;
        let a_pub = proto.get_client_ephemeral_a(&a);
        Ok(Self {
            proto,
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            a,
            a_pub,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `A`, sent to the server together with the username.
    pub fn public_ephemeral(&self) -> &ZkNum {
        &self.a_pub
    }

    /// Processes the server's `(salt, B)` reply: derives the scramble and
    /// session key, and produces the proof `M1` to send back.
    pub fn handle_server_reply(
        self,
        salt: &[u8],
        b_pub: &ZkNum,
    ) -> Result<(ClientAwaitingProof<D>, SessionProof<D>)> {
        let u = self.proto.calculate_random_scramble(&self.a_pub, b_pub)?;
        let key = self.proto.client_compute_session_key(
            salt,
            &self.username,
            &self.password,
            &self.a,
            b_pub,
            &u,
        )?;
        let m1 = self
            .proto
            .client_create_session_hash(&self.username, salt, &self.a_pub, b_pub, &key);

        let next = ClientAwaitingProof {
            proto: self.proto,
            a_pub: self.a_pub,
            m1: m1.clone(),
            key: Zeroizing::new(key.as_slice().to_vec()),
            u,
        };
        Ok((next, m1))
    }
}

/// Client side after sending `M1`, waiting for the server's proof `M2`.
pub struct ClientAwaitingProof<D: Digest = Sha256> {
    proto: ZkProtocol<D>,
    a_pub: ZkNum,
    m1: SessionProof<D>,
    key: Zeroizing<Vec<u8>>,
    u: ZkNum,
}

impl<D: Digest> ClientAwaitingProof<D> {
    /// Verifies `M2` in constant time. On mismatch the session is dead; the
    /// key material is dropped (and zeroized) with `self`.
    pub fn verify_server_proof(self, m2: &[u8]) -> Result<EstablishedSession> {
        let key = SessionKey::<D>::clone_from_slice(&self.key);
        let expected = self
            .proto
            .server_create_session_hash(&self.a_pub, &self.m1, &key);
        if !ct_eq_bytes(m2, expected.as_slice()) {
            return Err(ZkError::ProofMismatch);
        }
        Ok(EstablishedSession {
            key: self.key,
            u: self.u,
        })
    }
}

/// Server side after receiving `(username, A)`. Owns the private ephemeral
/// `b`; sends `(salt, B)` to the client.
#[derive(Debug)]
pub struct ServerSession<D: Digest = Sha256> {
    proto: ZkProtocol<D>,
    username: String,
    salt: Vec<u8>,
    key: ZkNum,
    b: ZkNum,
    b_pub: ZkNum,
    a_pub: ZkNum,
}

impl ServerSession<Sha256> {
    /// Responds to a client hello with the stored credential record. For an
    /// unknown username, pass a [decoy record](ZkProtocol::decoy_credentials)
    /// instead of failing, so enumeration is not possible.
    pub fn respond(username: &str, record: &CredentialRecord, a_pub: ZkNum) -> Result<Self> {
        Self::with_strength(Strength::Bits1024, username, record, a_pub)
    }
}

impl<D: Digest> ServerSession<D> {
    pub fn with_strength(
        strength: Strength,
        username: &str,
        record: &CredentialRecord,
        a_pub: ZkNum,
    ) -> Result<Self> {
        let proto = ZkProtocol::<D>::with_strength(strength);
        if a_pub.rem(&proto.group().n).is_zero() {
            return Err(ZkError::InvalidParameter("degenerate client ephemeral"));
        }
        let b = proto.crypt_rand()?;
        let b_pub = proto.get_server_ephemeral_b(&record.salt, &record.verifier, &b);
        Ok(Self {
            proto,
            username: username.to_owned(),
            salt: record.salt.clone(),
            key: record.key.clone(),
            b,
            b_pub,
            a_pub,
        })
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// `B`, sent to the client together with the salt.
    pub fn public_ephemeral(&self) -> &ZkNum {
        &self.b_pub
    }

    /// Verifies the client's proof `M1` in constant time; on success returns
    /// the established session and the proof `M2` to send back.
    pub fn verify_client_proof(
        self,
        m1: &[u8],
    ) -> Result<(EstablishedSession, SessionProof<D>)> {
        let u = self
            .proto
            .calculate_random_scramble(&self.a_pub, &self.b_pub)?;
        let key = self
            .proto
            .server_compute_session_key(&self.salt, &self.key, &self.a_pub, &self.b, &u)?;
        let expected = self.proto.client_create_session_hash(
            &self.username,
            &self.salt,
            &self.a_pub,
            &self.b_pub,
            &key,
        );
        if !ct_eq_bytes(m1, expected.as_slice()) {
            return Err(ZkError::ProofMismatch);
        }

        let m2 = self
            .proto
            .server_create_session_hash(&self.a_pub, &expected, &key);
        let session = EstablishedSession {
            key: Zeroizing::new(key.as_slice().to_vec()),
            u,
        };
        Ok((session, m2))
    }
}

/// Terminal success state: both sides proved knowledge of the same key.
/// The key bytes are zeroized when the session is dropped.
#[derive(Debug)]
pub struct EstablishedSession {
    key: Zeroizing<Vec<u8>>,
    u: ZkNum,
}

impl EstablishedSession {
    pub fn session_key(&self) -> &[u8] {
        &self.key
    }

    pub fn scramble(&self) -> &ZkNum {
        &self.u
    }

    /// Builds the session cipher from the agreed key material.
    pub fn cipher(&self, logger: Box<dyn ZkLogger>) -> ZkCrypto {
        ZkCrypto::new(&self.key, &self.u, logger)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::logger::NullLogger;

    const USERNAME: &str = "myuser@userdomain.com";
    const PASSWORD: &str = "cc3a6a12-0e5b-47fb-ae45-3485e34582d4";

    fn registered() -> CredentialRecord {
        ZkProtocol::new()
            .hash_credentials(USERNAME, PASSWORD)
            .unwrap()
    }

    #[test]
    fn typed_handshake_establishes_matching_keys() {
        let record = registered();

        let client = ClientSession::start(USERNAME, PASSWORD).unwrap();
        let a_pub = client.public_ephemeral().clone();

        let server = ServerSession::respond(USERNAME, &record, a_pub).unwrap();
        let salt = server.salt().to_vec();
        let b_pub = server.public_ephemeral().clone();

        let (client, m1) = client.handle_server_reply(&salt, &b_pub).unwrap();
        let (server_session, m2) = server.verify_client_proof(&m1).unwrap();
        let client_session = client.verify_server_proof(&m2).unwrap();

        assert_eq!(client_session.session_key(), server_session.session_key());
        assert!(client_session.scramble().ct_eq(server_session.scramble()));
    }

    #[test]
    fn ciphers_from_both_sides_interoperate() {
        let record = registered();
        let client = ClientSession::start(USERNAME, PASSWORD).unwrap();
        let server =
            ServerSession::respond(USERNAME, &record, client.public_ephemeral().clone()).unwrap();
        let salt = server.salt().to_vec();
        let b_pub = server.public_ephemeral().clone();
        let (client, m1) = client.handle_server_reply(&salt, &b_pub).unwrap();
        let (server_session, m2) = server.verify_client_proof(&m1).unwrap();
        let client_session = client.verify_server_proof(&m2).unwrap();

        let tx = server_session.cipher(Box::new(NullLogger));
        let rx = client_session.cipher(Box::new(NullLogger));
        let blob = tx.encrypt(b"post-handshake application data").unwrap();
        assert_eq!(
            rx.decrypt(&blob).unwrap(),
            b"post-handshake application data"
        );
    }

    #[test]
    fn wrong_password_fails_as_proof_mismatch() {
        let record = registered();
        let client = ClientSession::start(USERNAME, "guessed-wrong").unwrap();
        let server =
            ServerSession::respond(USERNAME, &record, client.public_ephemeral().clone()).unwrap();
        let salt = server.salt().to_vec();
        let b_pub = server.public_ephemeral().clone();

        let (_client, m1) = client.handle_server_reply(&salt, &b_pub).unwrap();
        let err = server.verify_client_proof(&m1).unwrap_err();
        assert!(matches!(err, ZkError::ProofMismatch));
    }

    #[test]
    fn unknown_user_fails_identically_to_wrong_password() {
        // No record exists for this user; the server answers with a decoy.
        let decoy = ZkProtocol::new().decoy_credentials().unwrap();
        let client = ClientSession::start("nobody@example.com", "whatever").unwrap();
        let server =
            ServerSession::respond("nobody@example.com", &decoy, client.public_ephemeral().clone())
                .unwrap();
        let salt = server.salt().to_vec();
        let b_pub = server.public_ephemeral().clone();

        let (_client, m1) = client.handle_server_reply(&salt, &b_pub).unwrap();
        let err = server.verify_client_proof(&m1).unwrap_err();
        assert!(matches!(err, ZkError::ProofMismatch));
    }

    #[test]
    fn tampered_server_proof_is_rejected() {
        let record = registered();
        let client = ClientSession::start(USERNAME, PASSWORD).unwrap();
        let server =
            ServerSession::respond(USERNAME, &record, client.public_ephemeral().clone()).unwrap();
        let salt = server.salt().to_vec();
        let b_pub = server.public_ephemeral().clone();
        let (client, m1) = client.handle_server_reply(&salt, &b_pub).unwrap();
        let (_server_session, m2) = server.verify_client_proof(&m1).unwrap();

        let mut forged = m2.as_slice().to_vec();
        forged[0] ^= 0x01;
        let err = client.verify_server_proof(&forged).unwrap_err();
        assert!(matches!(err, ZkError::ProofMismatch));
    }

    #[test]
    fn zero_client_ephemeral_is_rejected_up_front() {
        let record = registered();
        let err = ServerSession::respond(USERNAME, &record, ZkNum::from_u32(0)).unwrap_err();
        assert!(matches!(err, ZkError::InvalidParameter(_)));
    }
}
