#![doc = include_str!("../README.md")]

mod error;
pub use error::CryptoError;
pub(crate) use error::Result;
mod handshake;
pub use handshake::{
    build_handshake, ClientNonce, EphemeralKeyPair, HandshakePayload, CLIENT_NONCE_SIZE,
    HANDSHAKE_PAYLOAD_SIZE, ONE_TIME_AUTH_TAG_SIZE, PUBLIC_KEY_SIZE,
};
mod saslprep;
pub use saslprep::{saslprep, SaslPrepError};
mod scram;
pub use scram::{hmac_digest, salted_password, ScramAlgorithm, UnknownScramLabel};
