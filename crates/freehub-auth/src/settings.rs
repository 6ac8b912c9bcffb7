//! Users and their advertised authentication methods.
//!
//! The hub publishes a `settings.json` document listing every local user
//! together with the salt and iteration count for each authentication method
//! it will accept for them. The caller fetches the document out of band;
//! this module only parses and validates it.

use std::{collections::HashMap, num::NonZeroU32};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use thiserror::Error;

/// The settings document could not be turned into usable auth methods.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The document is not valid JSON of the expected shape.
    #[error("Failed to parse settings document: {0}")]
    Json(#[from] serde_json::Error),
    /// A method's salt is missing, empty, or not valid base64.
    #[error("Auth method {label} of user {user} has an invalid salt")]
    InvalidSalt {
        /// User the method belongs to.
        user: String,
        /// Advertised method label.
        label: String,
    },
    /// A method advertises an iteration count of zero.
    #[error("Auth method {label} of user {user} has zero iterations")]
    ZeroIterations {
        /// User the method belongs to.
        user: String,
        /// Advertised method label.
        label: String,
    },
}

/// Salt parameters advertised by the hub for one method of one user.
///
/// Immutable once parsed; the invariants (iterations ≥ 1, non-empty salt)
/// are enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMethod {
    iterations: NonZeroU32,
    salt: Vec<u8>,
}

/// Marker error for an empty salt.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Salt must not be empty")]
pub struct EmptySaltError;

impl AuthMethod {
    /// Builds a descriptor, rejecting an empty salt.
    pub fn new(iterations: NonZeroU32, salt: Vec<u8>) -> Result<Self, EmptySaltError> {
        if salt.is_empty() {
            return Err(EmptySaltError);
        }
        Ok(Self { iterations, salt })
    }

    /// Advertised iteration count for the `Hi` derivation.
    pub fn iterations(&self) -> NonZeroU32 {
        self.iterations
    }

    /// Advertised raw salt bytes.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }
}

/// A hub user together with the methods the hub advertises for them.
///
/// Methods with labels this crate never negotiates are preserved untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Display name, the key of the settings document entry.
    pub name: String,
    /// Addressable identity used in RPC calls.
    pub jid: String,
    /// Advertised auth methods, keyed by method label.
    pub auth_methods: HashMap<String, AuthMethod>,
}

#[derive(Deserialize)]
struct SettingsDocument {
    users: Vec<RawUser>,
}

#[derive(Deserialize)]
struct RawUser {
    name: String,
    jid: String,
    #[serde(default)]
    authmethods: HashMap<String, RawAuthMethod>,
}

#[derive(Deserialize)]
struct RawAuthMethod {
    iterations: u32,
    salt: String,
}

/// Parses the hub's `settings.json` document into users keyed by name.
pub fn parse_settings(json: &str) -> Result<HashMap<String, User>, SettingsError> {
    let document: SettingsDocument = serde_json::from_str(json)?;

    let mut users = HashMap::new();
    for raw_user in document.users {
        let mut auth_methods = HashMap::new();
        for (label, raw_method) in raw_user.authmethods {
            let invalid_salt = || SettingsError::InvalidSalt {
                user: raw_user.name.clone(),
                label: label.clone(),
            };
            let iterations = NonZeroU32::new(raw_method.iterations).ok_or_else(|| {
                SettingsError::ZeroIterations {
                    user: raw_user.name.clone(),
                    label: label.clone(),
                }
            })?;
            let salt = STANDARD
                .decode(&raw_method.salt)
                .map_err(|_| invalid_salt())?;
            let method = AuthMethod::new(iterations, salt).map_err(|_| invalid_salt())?;
            auth_methods.insert(label, method);
        }
        users.insert(
            raw_user.name.clone(),
            User {
                name: raw_user.name,
                jid: raw_user.jid,
                auth_methods,
            },
        );
    }
    Ok(users)
}
