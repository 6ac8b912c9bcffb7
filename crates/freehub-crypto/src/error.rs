use thiserror::Error;

/// Errors from the handshake primitives.
///
/// Every variant is a defensive invariant failure: callers must abort the
/// attempt instead of sending a payload built from mismatched sizes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The salted password does not match the digest size of the negotiated
    /// hash, so the derivation that produced it is broken.
    #[error("Salted password is {got} bytes, expected {expected}")]
    SaltedPasswordLength {
        /// Digest size of the negotiated hash.
        expected: usize,
        /// Actual length of the provided salted password.
        got: usize,
    },
    /// The MAC primitive rejected the provided key material.
    #[error("MAC key rejected")]
    MacKeyRejected,
}

pub(crate) type Result<T, E = CryptoError> = std::result::Result<T, E>;
