use freehub_crypto::HandshakePayload;
use thiserror::Error;

/// RPC method performing the local key exchange on the hub.
pub const CRYPT_EXCHANGE_METHOD: &str = "RemoteInterface.cryptExchangeLocalKeys2";

/// Key exchange protocol version, currently always 0.
pub const PROTOCOL_VERSION: u32 = 0;

/// Opaque failure from the transport collaborator.
///
/// Timeouts and cancellation are the transport's responsibility; this layer
/// only propagates.
#[derive(Debug, Error)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

/// Seam to the RPC transport that talks to the hub.
///
/// The call corresponding to [`CRYPT_EXCHANGE_METHOD`] may block until the
/// hub responds. The returned bytes are the hub's raw response, uninterpreted
/// by this crate.
pub trait KeyExchangeTransport {
    /// Sends the 64-byte handshake payload for `jid` and returns the hub's
    /// raw response.
    fn crypt_exchange_local_keys(
        &mut self,
        jid: &str,
        payload: &HandshakePayload,
        method_label: &str,
        protocol_version: u32,
    ) -> Result<Vec<u8>, TransportError>;
}
