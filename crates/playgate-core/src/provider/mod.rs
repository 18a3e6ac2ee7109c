//! Identity provider contract.
//!
//! The provider SDK is an external collaborator. Requests return immediately and
//! resolve later through the callbacks registered with `on_player_sign_in` /
//! `on_player_sign_out`. A callback fires exactly once per request.

pub mod simulated;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Local user slot on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot(pub u32);

impl Slot {
    /// The default local user slot.
    pub const DEFAULT: Slot = Slot(1);
}

impl Default for Slot {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a provider request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Succeeded,
    Failed,
    Cancelled,
}

impl AuthStatus {
    pub fn is_success(self) -> bool {
        matches!(self, AuthStatus::Succeeded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthStatus::Succeeded => "succeeded",
            AuthStatus::Failed => "failed",
            AuthStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record handed out on a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub display_name: String,
    /// Provider-stable account id. Opaque to the client.
    pub stable_id: String,
}

impl UserIdentity {
    pub fn new(display_name: impl Into<String>, stable_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            stable_id: stable_id.into(),
        }
    }
}

/// Payload delivered to a registered callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub identity: Option<UserIdentity>,
    pub status: AuthStatus,
    pub error: Option<String>,
}

impl AuthOutcome {
    pub fn succeeded(identity: UserIdentity) -> Self {
        Self {
            identity: Some(identity),
            status: AuthStatus::Succeeded,
            error: None,
        }
    }

    pub fn unsuccessful(status: AuthStatus, error: impl Into<String>) -> Self {
        Self {
            identity: None,
            status,
            error: Some(error.into()),
        }
    }
}

/// Completion callback. Invoked from whatever task resolves the request.
pub type AuthCallback = Arc<dyn Fn(AuthOutcome) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("identity provider is not ready")]
    NotReady,
    #[error("a callback is already registered for slot {slot}")]
    AlreadyRegistered { slot: Slot },
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Client side of the platform identity SDK.
pub trait IdentityProvider: Send + Sync {
    /// Starts a sign-in for `slot`. Resolves through the sign-in callback.
    fn sign_in(&self, slot: Slot);

    /// Starts a sign-out for `slot`. Resolves through the sign-out callback.
    fn sign_out(&self, slot: Slot);

    /// Asks the platform to switch the account bound to `slot`.
    fn switch_user(&self, slot: Slot);

    /// Registers the sign-in completion callback.
    ///
    /// # Errors
    /// Returns an error if the provider cannot accept callbacks yet.
    fn on_player_sign_in(&self, slot: Slot, callback: AuthCallback) -> Result<(), ProviderError>;

    /// Registers the sign-out completion callback.
    ///
    /// # Errors
    /// Returns an error if the provider cannot accept callbacks yet.
    fn on_player_sign_out(&self, slot: Slot, callback: AuthCallback)
    -> Result<(), ProviderError>;
}
