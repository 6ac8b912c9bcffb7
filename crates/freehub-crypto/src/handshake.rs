//! Local key exchange payload.
//!
//! The hub expects a fixed 64-byte value: the client's ephemeral X25519
//! public key, a 16-byte nonce, and a Poly1305 tag binding the public key to
//! the salted password. The tag key is a keyed BLAKE2b-256 of the salted
//! password under the nonce. No padding, no length prefix.

use blake2::{
    digest::{consts::U32, Mac},
    Blake2bMac,
};
use poly1305::Poly1305;
use rand::{rngs::OsRng, RngCore};
use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
use zeroize::Zeroizing;

use crate::{CryptoError, Result, ScramAlgorithm};

/// X25519 public key length.
pub const PUBLIC_KEY_SIZE: usize = 32;
/// Client nonce length.
pub const CLIENT_NONCE_SIZE: usize = 16;
/// Poly1305 tag length.
pub const ONE_TIME_AUTH_TAG_SIZE: usize = 16;
/// Total payload length; the hub rejects anything else.
pub const HANDSHAKE_PAYLOAD_SIZE: usize = 64;

const ONE_TIME_AUTH_KEY_SIZE: usize = 32;

// The wire layout is public key ‖ nonce ‖ tag with no framing, so the
// segment sizes must account for the whole payload.
const _: () =
    assert!(PUBLIC_KEY_SIZE + CLIENT_NONCE_SIZE + ONE_TIME_AUTH_TAG_SIZE == HANDSHAKE_PAYLOAD_SIZE);

/// Ephemeral X25519 keypair for one authentication attempt.
///
/// The secret half is zeroized on drop and must never be reused across
/// attempts.
pub struct EphemeralKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EphemeralKeyPair {
    /// Generates a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// The public half, as sent in the handshake payload.
    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        self.public.as_bytes()
    }

    /// Derives the shared secret with the hub's public key, for use by the
    /// encrypted channel established after authentication.
    pub fn diffie_hellman(&self, their_public: &PublicKey) -> SharedSecret {
        self.secret.diffie_hellman(their_public)
    }
}

impl std::fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// 16 random bytes, fresh per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientNonce([u8; CLIENT_NONCE_SIZE]);

impl ClientNonce {
    /// Draws a fresh nonce from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut nonce = [0u8; CLIENT_NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        Self(nonce)
    }

    /// The raw nonce bytes.
    pub fn as_bytes(&self) -> &[u8; CLIENT_NONCE_SIZE] {
        &self.0
    }
}

/// The assembled 64-byte payload, sent to the hub verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakePayload([u8; HANDSHAKE_PAYLOAD_SIZE]);

impl HandshakePayload {
    /// The raw payload bytes.
    pub fn as_bytes(&self) -> &[u8; HANDSHAKE_PAYLOAD_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for HandshakePayload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Builds the handshake payload for one authentication attempt.
///
/// Generates a fresh keypair and nonce, binds the public key to the salted
/// password via keyed BLAKE2b-256 and Poly1305, and assembles the payload.
/// Fails if `salted_password` does not match the digest size of the
/// negotiated algorithm, since that means the derivation step is broken.
pub fn build_handshake(
    algorithm: ScramAlgorithm,
    salted_password: &[u8],
) -> Result<(HandshakePayload, EphemeralKeyPair, ClientNonce)> {
    let key_pair = EphemeralKeyPair::generate();
    let nonce = ClientNonce::generate();

    if salted_password.len() != algorithm.digest_size() {
        return Err(CryptoError::SaltedPasswordLength {
            expected: algorithm.digest_size(),
            got: salted_password.len(),
        });
    }

    let ota_key = one_time_auth_key(salted_password, nonce.as_bytes())?;
    let tag = one_time_auth_tag(key_pair.public_key_bytes(), &ota_key);

    const NONCE_OFFSET: usize = PUBLIC_KEY_SIZE;
    const TAG_OFFSET: usize = PUBLIC_KEY_SIZE + CLIENT_NONCE_SIZE;

    let mut payload = [0u8; HANDSHAKE_PAYLOAD_SIZE];
    payload[..NONCE_OFFSET].copy_from_slice(key_pair.public_key_bytes());
    payload[NONCE_OFFSET..TAG_OFFSET].copy_from_slice(nonce.as_bytes());
    payload[TAG_OFFSET..].copy_from_slice(&tag);

    Ok((HandshakePayload(payload), key_pair, nonce))
}

/// Keyed BLAKE2b-256 of the salted password under the client nonce, sized
/// for a Poly1305 key.
fn one_time_auth_key(
    salted_password: &[u8],
    nonce: &[u8; CLIENT_NONCE_SIZE],
) -> Result<Zeroizing<[u8; ONE_TIME_AUTH_KEY_SIZE]>> {
    let mut mac =
        Blake2bMac::<U32>::new_from_slice(nonce).map_err(|_| CryptoError::MacKeyRejected)?;
    mac.update(salted_password);
    Ok(Zeroizing::new(mac.finalize().into_bytes().into()))
}

/// Poly1305 over a single message; key must never authenticate twice.
fn one_time_auth_tag(
    message: &[u8],
    key: &[u8; ONE_TIME_AUTH_KEY_SIZE],
) -> [u8; ONE_TIME_AUTH_TAG_SIZE] {
    use poly1305::universal_hash::KeyInit;

    Poly1305::new(key.into()).compute_unpadded(message).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_64_bytes_with_expected_layout() {
        let salted = [0x42u8; 32];
        let (payload, key_pair, nonce) =
            build_handshake(ScramAlgorithm::Sha256, &salted).unwrap();

        let bytes = payload.as_bytes();
        assert_eq!(bytes.len(), HANDSHAKE_PAYLOAD_SIZE);
        assert_eq!(&bytes[..32], key_pair.public_key_bytes());
        assert_eq!(&bytes[32..48], nonce.as_bytes());

        let ota_key = one_time_auth_key(&salted, nonce.as_bytes()).unwrap();
        let tag = one_time_auth_tag(key_pair.public_key_bytes(), &ota_key);
        assert_eq!(&bytes[48..], &tag);
    }

    #[test]
    fn sha1_digest_size_is_accepted() {
        let salted = [0x42u8; 20];
        assert!(build_handshake(ScramAlgorithm::Sha1, &salted).is_ok());
    }

    #[test]
    fn rejects_salted_password_of_wrong_length() {
        let salted = [0x42u8; 20];
        let result = build_handshake(ScramAlgorithm::Sha256, &salted);
        assert!(matches!(
            result,
            Err(CryptoError::SaltedPasswordLength {
                expected: 32,
                got: 20
            })
        ));
    }

    #[test]
    fn repeated_builds_are_fresh() {
        let salted = [0x42u8; 32];
        let (payload_a, pair_a, nonce_a) =
            build_handshake(ScramAlgorithm::Sha256, &salted).unwrap();
        let (payload_b, pair_b, nonce_b) =
            build_handshake(ScramAlgorithm::Sha256, &salted).unwrap();

        assert_ne!(pair_a.public_key_bytes(), pair_b.public_key_bytes());
        assert_ne!(nonce_a, nonce_b);
        assert_ne!(payload_a, payload_b);
    }

    #[test]
    fn diffie_hellman_agrees_between_two_keypairs() {
        let a = EphemeralKeyPair::generate();
        let b = EphemeralKeyPair::generate();
        let ab = a.diffie_hellman(&PublicKey::from(*b.public_key_bytes()));
        let ba = b.diffie_hellman(&PublicKey::from(*a.public_key_bytes()));
        assert_eq!(ab.as_bytes(), ba.as_bytes());
    }

    #[test]
    fn one_time_auth_key_matches_keyed_blake2b() {
        let salted: [u8; 32] = [
            0xd4, 0x74, 0xd9, 0x04, 0xb2, 0x3e, 0x23, 0xc5, 0x51, 0x1f, 0x97, 0xc4, 0x6f, 0xa4,
            0x60, 0xbb, 0x2a, 0x42, 0x5a, 0x27, 0xea, 0x5a, 0xe8, 0xf7, 0x15, 0x45, 0xaa, 0x0f,
            0xb8, 0x1d, 0xe8, 0xe0,
        ];
        let nonce: [u8; 16] = [
            0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab, 0xac, 0xad,
            0xae, 0xaf,
        ];
        let expected: [u8; 32] = [
            104, 0, 17, 64, 30, 244, 201, 169, 14, 51, 51, 220, 14, 108, 228, 47, 232, 158, 6, 15,
            232, 224, 196, 35, 113, 106, 169, 139, 2, 216, 101, 121,
        ];
        assert_eq!(*one_time_auth_key(&salted, &nonce).unwrap(), expected);
    }

    #[test]
    fn one_time_auth_tag_matches_rfc8439_vector() {
        let key: [u8; 32] = [
            0x85, 0xd6, 0xbe, 0x78, 0x57, 0x55, 0x6d, 0x33, 0x7f, 0x44, 0x52, 0xfe, 0x42, 0xd5,
            0x06, 0xa8, 0x01, 0x03, 0x80, 0x8a, 0xfb, 0x0d, 0xb2, 0xfd, 0x4a, 0xbf, 0xf6, 0xaf,
            0x41, 0x49, 0xf5, 0x1b,
        ];
        let message = b"Cryptographic Forum Research Group";
        let expected: [u8; 16] = [
            0xa8, 0x06, 0x1d, 0xc1, 0x30, 0x51, 0x36, 0xc6, 0xc2, 0x2b, 0x8b, 0xaf, 0x0c, 0x01,
            0x27, 0xa9,
        ];
        assert_eq!(one_time_auth_tag(message, &key), expected);
    }
}
