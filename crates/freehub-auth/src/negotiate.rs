use std::collections::HashMap;

use freehub_crypto::ScramAlgorithm;

use crate::AuthMethod;

/// Default preference order, strongest first.
///
/// Constructed once and passed explicitly; there is deliberately no global
/// registration of algorithms.
pub const DEFAULT_ALGORITHM_PREFERENCES: &[ScramAlgorithm] =
    &[ScramAlgorithm::Sha256, ScramAlgorithm::Sha1];

/// Picks the first preferred algorithm the hub advertises for this user.
///
/// First match wins; list order is the only ranking. Returns `None` when
/// there is no overlap.
pub fn negotiate<'a>(
    preferences: &[ScramAlgorithm],
    advertised: &'a HashMap<String, AuthMethod>,
) -> Option<(ScramAlgorithm, &'a AuthMethod)> {
    preferences
        .iter()
        .find_map(|&algorithm| advertised.get(algorithm.label()).map(|m| (algorithm, m)))
}
