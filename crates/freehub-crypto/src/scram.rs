//! Salted password derivation for the hub's SCRAM-style key exchange.
//!
//! Implements the `Hi` function of
//! [RFC 5802](https://datatracker.ietf.org/doc/html/rfc5802#section-2.2):
//! a chained-HMAC accumulator where every round MACs the previous round's
//! output and XORs it into the result. The hub stores verifiers derived with
//! exactly this recurrence, so it is implemented directly rather than through
//! a generic KDF.

use std::{fmt, num::NonZeroU32, str::FromStr};

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{CryptoError, Result};

/// Hash algorithms supported for the salted-password derivation.
///
/// The hub advertises these as `SCRAM-<hash>` method labels; the HMAC used
/// by the derivation is determined by the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScramAlgorithm {
    /// HMAC-SHA-256, 32-byte digests. Label `SCRAM-SHA-256`.
    Sha256,
    /// HMAC-SHA-1, 20-byte digests. Label `SCRAM-SHA-1`.
    Sha1,
}

impl ScramAlgorithm {
    /// Output length in bytes of the underlying hash.
    pub fn digest_size(self) -> usize {
        match self {
            ScramAlgorithm::Sha256 => 32,
            ScramAlgorithm::Sha1 => 20,
        }
    }

    /// The method label the hub advertises for this algorithm.
    pub fn label(self) -> &'static str {
        match self {
            ScramAlgorithm::Sha256 => "SCRAM-SHA-256",
            ScramAlgorithm::Sha1 => "SCRAM-SHA-1",
        }
    }
}

impl fmt::Display for ScramAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The label is not a SCRAM method this crate implements.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown SCRAM method label")]
pub struct UnknownScramLabel;

impl FromStr for ScramAlgorithm {
    type Err = UnknownScramLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCRAM-SHA-256" => Ok(ScramAlgorithm::Sha256),
            "SCRAM-SHA-1" => Ok(ScramAlgorithm::Sha1),
            _ => Err(UnknownScramLabel),
        }
    }
}

/// Derives the salted password via the RFC 5802 `Hi` recurrence.
///
/// `U1 = HMAC(password, salt ‖ INT(1))`, `Uc = HMAC(password, U(c-1))`,
/// result is the XOR of all rounds. The output length always equals
/// [`ScramAlgorithm::digest_size`].
pub fn salted_password(
    algorithm: ScramAlgorithm,
    password: &[u8],
    salt: &[u8],
    iterations: NonZeroU32,
) -> Result<Zeroizing<Vec<u8>>> {
    match algorithm {
        ScramAlgorithm::Sha256 => hi::<Hmac<Sha256>>(password, salt, iterations),
        ScramAlgorithm::Sha1 => hi::<Hmac<Sha1>>(password, salt, iterations),
    }
}

/// One-shot HMAC under the chosen algorithm.
pub fn hmac_digest(algorithm: ScramAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    fn digest<M: Mac>(mut mac: M, message: &[u8]) -> Vec<u8> {
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
    let rejected = |_| CryptoError::MacKeyRejected;
    Ok(match algorithm {
        ScramAlgorithm::Sha256 => {
            digest(Hmac::<Sha256>::new_from_slice(key).map_err(rejected)?, message)
        }
        ScramAlgorithm::Sha1 => {
            digest(Hmac::<Sha1>::new_from_slice(key).map_err(rejected)?, message)
        }
    })
}

fn hi<M>(password: &[u8], salt: &[u8], iterations: NonZeroU32) -> Result<Zeroizing<Vec<u8>>>
where
    M: Mac + hmac::digest::KeyInit + Clone,
{
    let mac = <M as Mac>::new_from_slice(password).map_err(|_| CryptoError::MacKeyRejected)?;

    let mut round = mac.clone();
    round.update(salt);
    round.update(&1u32.to_be_bytes());
    let mut u_prev = round.finalize().into_bytes();
    let mut result = Zeroizing::new(u_prev.as_slice().to_vec());

    for _ in 1..iterations.get() {
        let mut round = mac.clone();
        round.update(u_prev.as_slice());
        // Wipe the previous round's digest before the move overwrites it.
        u_prev.as_mut_slice().fill(0);
        u_prev = round.finalize().into_bytes();
        for (acc, u) in result.iter_mut().zip(u_prev.as_slice()) {
            *acc ^= u;
        }
    }
    u_prev.as_mut_slice().fill(0);

    Ok(result)
}
