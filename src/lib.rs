//! Zero-knowledge password proof (SRP-6a) implementation in pure rust
//!
//! Two parties holding a shared username/password prove knowledge of it to
//! each other without ever sending the password, a password-equivalent, or
//! anything an offline dictionary attack can directly chew on. Both sides
//! derive the same session key from independent random exponents and a
//! stored verifier, exchange proof hashes, and then protect application
//! payloads with an authenticated cipher keyed from that session.
//!
//! # Usage
//!
//! Registration (once per user, record persisted by the caller):
//!
//! ```
//! use zkproto::ZkProtocol;
//!
//! let proto = ZkProtocol::new();
//! let record = proto.hash_credentials("alice@example.com", "hunter2").unwrap();
//! ```
//!
//! Handshake, through the typed sessions:
//!
//! ```
//! use zkproto::{ClientSession, NullLogger, ServerSession, ZkProtocol};
//!
//! # let record = ZkProtocol::new().hash_credentials("alice@example.com", "hunter2").unwrap();
//! // client -> server: username, A
//! let client = ClientSession::start("alice@example.com", "hunter2").unwrap();
//! let a_pub = client.public_ephemeral().clone();
//!
//! // server -> client: salt, B
//! let server = ServerSession::respond("alice@example.com", &record, a_pub).unwrap();
//! let (salt, b_pub) = (server.salt().to_vec(), server.public_ephemeral().clone());
//!
//! // client -> server: M1; server -> client: M2
//! let (client, m1) = client.handle_server_reply(&salt, &b_pub).unwrap();
//! let (server_session, m2) = server.verify_client_proof(&m1).unwrap();
//! let client_session = client.verify_server_proof(&m2).unwrap();
//!
//! // both ends now encrypt application data under the agreed key
//! let tx = client_session.cipher(Box::new(NullLogger));
//! let rx = server_session.cipher(Box::new(NullLogger));
//! let blob = tx.encrypt(b"application payload").unwrap();
//! assert_eq!(rx.decrypt(&blob).unwrap(), b"application payload");
//! ```
//!
//! Transport framing, RPC dispatch, and credential persistence are the
//! caller's business; this crate only fixes the canonical big-endian byte
//! encoding of protocol integers.

mod bigint;
mod crypto;
mod error;
mod groups;
mod logger;
mod protocol;
mod session;

pub use bigint::{ct_eq_bytes, ZkNum};
pub use crypto::{ZkCrypto, OVERHEAD};
pub use error::{Result, ZkError};
pub use groups::{Strength, ZkGroup};
pub use logger::{LogFacade, NullLogger, ZkLogger};
pub use protocol::{CredentialRecord, SessionKey, SessionProof, ZkProtocol};
pub use session::{ClientAwaitingProof, ClientSession, EstablishedSession, ServerSession};
