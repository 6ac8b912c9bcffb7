//! One authentication attempt against the hub.

use freehub_crypto::{
    build_handshake, salted_password, saslprep, EphemeralKeyPair, ScramAlgorithm,
};
use log::debug;
use zeroize::Zeroizing;

use crate::{
    negotiate, AuthError, KeyExchangeTransport, User, DEFAULT_ALGORITHM_PREFERENCES,
    PROTOCOL_VERSION,
};

/// Progress of an attempt. Strictly linear; earlier states are never
/// revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    MethodSelected,
    KeysGenerated,
    PayloadSent,
    Authenticated,
    Failed,
}

/// A single authentication attempt.
///
/// [`AuthSession::authenticate`] consumes the session, so every attempt gets
/// its own instance and therefore its own keypair and nonce; retrying means
/// constructing a new session. Not meant to be shared between threads.
pub struct AuthSession<T> {
    transport: T,
    preferences: Vec<ScramAlgorithm>,
    state: SessionState,
}

/// Outcome of a successful key exchange.
///
/// The hub's raw response is NOT verified against an expected server proof:
/// success here only means the transport call went through. Callers that
/// need mutual authentication must validate `server_response` themselves
/// before trusting the channel built from `key_pair`.
pub struct EstablishedSession {
    /// The ephemeral keypair bound into the handshake, for deriving the
    /// shared channel key.
    pub key_pair: EphemeralKeyPair,
    /// The hub's raw, unverified response to the key exchange.
    pub server_response: Vec<u8>,
}

impl<T: KeyExchangeTransport> AuthSession<T> {
    /// Creates a session using [`DEFAULT_ALGORITHM_PREFERENCES`].
    pub fn new(transport: T) -> Self {
        Self::with_preferences(transport, DEFAULT_ALGORITHM_PREFERENCES.to_vec())
    }

    /// Creates a session with an explicit algorithm preference order.
    pub fn with_preferences(transport: T, preferences: Vec<ScramAlgorithm>) -> Self {
        Self {
            transport,
            preferences,
            state: SessionState::Idle,
        }
    }

    /// Runs the full attempt: negotiate, prepare the password, derive the
    /// salted password, build the handshake, and exchange keys over the
    /// transport.
    ///
    /// Fails before any network call unless a complete payload was built.
    /// Retry policy belongs to the caller.
    pub fn authenticate(
        mut self,
        user: &User,
        password: &str,
    ) -> Result<EstablishedSession, AuthError> {
        let result = self.run(user, password);
        match &result {
            Ok(_) => self.advance(SessionState::Authenticated),
            Err(e) => {
                debug!("Authentication attempt for {} failed: {e}", user.name);
                self.advance(SessionState::Failed);
            }
        }
        result
    }

    fn run(&mut self, user: &User, password: &str) -> Result<EstablishedSession, AuthError> {
        let (algorithm, method) = negotiate(&self.preferences, &user.auth_methods)
            .ok_or(AuthError::UnsupportedAlgorithm)?;
        debug!("Negotiated {algorithm} for {}", user.name);
        self.advance(SessionState::MethodSelected);

        let prepared = Zeroizing::new(saslprep(password)?);
        let salted = salted_password(
            algorithm,
            prepared.as_bytes(),
            method.salt(),
            method.iterations(),
        )?;

        let (payload, key_pair, _nonce) = build_handshake(algorithm, &salted)?;
        self.advance(SessionState::KeysGenerated);

        self.advance(SessionState::PayloadSent);
        let server_response = self.transport.crypt_exchange_local_keys(
            &user.jid,
            &payload,
            algorithm.label(),
            PROTOCOL_VERSION,
        )?;

        Ok(EstablishedSession {
            key_pair,
            server_response,
        })
    }

    fn advance(&mut self, next: SessionState) {
        debug!("Auth session {:?} -> {next:?}", self.state);
        self.state = next;
    }
}
