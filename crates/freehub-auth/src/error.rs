use freehub_crypto::{CryptoError, SaslPrepError};
use thiserror::Error;

use crate::TransportError;

/// Why an authentication attempt failed.
///
/// An attempt either produces one complete handshake or fails before any
/// network call; nothing here is retried internally.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The hub advertised no method we implement. Fatal for this hub
    /// configuration.
    #[error("No mutually supported authentication method")]
    UnsupportedAlgorithm,
    /// The password was rejected during preparation; the user must supply a
    /// different one.
    #[error(transparent)]
    Validation(#[from] SaslPrepError),
    /// A primitive size invariant failed; the payload was not sent.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// The transport collaborator failed; propagated unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
