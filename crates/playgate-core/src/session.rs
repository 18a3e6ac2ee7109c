//! Sign-in session state owned by the controller.

use crate::provider::UserIdentity;

/// Current sign-in state.
///
/// `signed_in` is derived from the identity, so a signed-in session always
/// carries an identity and a signed-out session never does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInSession {
    identity: Option<UserIdentity>,
    prompt_closed: bool,
}

impl SignInSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    pub fn prompt_closed(&self) -> bool {
        self.prompt_closed
    }

    pub(crate) fn sign_in(&mut self, identity: UserIdentity) {
        self.identity = Some(identity);
    }

    /// Returns the identity that was signed out, if any.
    pub(crate) fn sign_out(&mut self) -> Option<UserIdentity> {
        self.identity.take()
    }

    /// Latches the prompt-closed flag. There is no way to reopen it.
    pub(crate) fn mark_prompt_closed(&mut self) {
        self.prompt_closed = true;
    }
}

/// Read-only view published to other components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub signed_in: bool,
    pub display_name: Option<String>,
    pub prompt_closed: bool,
    pub prompt_visible: bool,
    pub animating: bool,
}
