//! Inbox event types.
//!
//! Every asynchronous result (provider callbacks, animator frames, prompt
//! timers) is delivered to the controller as a `SigninEvent` on one channel,
//! so state changes are applied one at a time by whoever drains it.

use tokio::sync::mpsc;

use crate::provider::AuthOutcome;
use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigninEvent {
    /// Sign-in callback fired (also used for switch-user results).
    SignIn(AuthOutcome),
    /// Sign-out callback fired.
    SignOut(AuthOutcome),
    /// Animator reached a new phase.
    AnimationFrame {
        task: TaskId,
        phase: usize,
        text: String,
    },
    /// Prompt close transition finished settling.
    PromptSettled { task: TaskId },
}

/// User-triggered operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    SignInButton,
    NoThanks,
    SignOut,
}

pub type EventSender = mpsc::UnboundedSender<SigninEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SigninEvent>;
