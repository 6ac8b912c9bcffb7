#![doc = include_str!("../README.md")]

mod error;
pub use error::AuthError;
mod negotiate;
pub use negotiate::{negotiate, DEFAULT_ALGORITHM_PREFERENCES};
mod session;
pub use session::{AuthSession, EstablishedSession};
mod settings;
pub use settings::{parse_settings, AuthMethod, EmptySaltError, SettingsError, User};
mod transport;
pub use transport::{KeyExchangeTransport, TransportError, CRYPT_EXCHANGE_METHOD, PROTOCOL_VERSION};
