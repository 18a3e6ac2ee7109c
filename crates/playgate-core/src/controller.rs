//! Sign-in controller.
//!
//! Owns the `SignInSession`, decides whether to show the first-run prompt,
//! issues provider requests and applies their results. All methods run on the
//! task that drains the inbox; nothing here is shared across threads.
//!
//! ## Startup
//!
//! | prompt_on_start | signed in before | result                         |
//! |-----------------|------------------|--------------------------------|
//! | true            | false            | prompt shown                   |
//! | any             | true             | prompt skipped, sign-in starts |
//! | false           | false            | prompt skipped, nothing else   |

use std::sync::Arc;

use tokio::sync::watch;

use crate::animator::Animator;
use crate::config::{Config, TextConfig, TimingConfig};
use crate::events::{EventSender, SigninEvent, UiAction};
use crate::provider::{
    AuthCallback, AuthOutcome, AuthStatus, IdentityProvider, ProviderError, Slot, UserIdentity,
};
use crate::session::{SessionSnapshot, SignInSession};
use crate::store::FlagStore;
use crate::surface::{PresentationSurface, Transition};
use crate::task::{TaskId, TaskSeq};

/// Outcome of the one-time startup decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupDecision {
    /// First run: the prompt is open and nothing was requested yet.
    PromptShown,
    /// The player signed in before: a sign-in request is in flight.
    AutoSignIn,
    /// No prompt and no sign-in.
    Idle,
}

/// Failures while applying a provider callback. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    #[error("provider reported {status} without an identity record")]
    MissingIdentity { status: AuthStatus },
}

/// External collaborators injected by the composition root.
pub struct Collaborators {
    pub provider: Arc<dyn IdentityProvider>,
    pub surface: Box<dyn PresentationSurface>,
    pub store: Box<dyn FlagStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPhase {
    Hidden,
    Open,
    /// Close transition fired; the hide happens when `task` settles.
    Closing { task: TaskId },
}

pub struct SigninController {
    prompt_on_start: bool,
    slot: Slot,
    flag_key: String,
    focus_on_prompt: String,
    focus_on_finish: Option<String>,
    text: TextConfig,
    timing: TimingConfig,

    provider: Arc<dyn IdentityProvider>,
    surface: Box<dyn PresentationSurface>,
    store: Box<dyn FlagStore>,
    inbox: EventSender,

    session: SignInSession,
    prompt: PromptPhase,
    animator: Animator,
    tasks: TaskSeq,
    /// Whether provider callbacks are wired to the inbox.
    callbacks_live: bool,
    /// Provider requests whose callback has not arrived yet.
    pending_requests: usize,
    decision: Option<StartupDecision>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl SigninController {
    pub fn new(config: &Config, collaborators: Collaborators, inbox: EventSender) -> Self {
        let Collaborators {
            provider,
            surface,
            store,
        } = collaborators;
        let (snapshot, _) = watch::channel(SessionSnapshot::default());

        Self {
            prompt_on_start: config.prompt_on_start,
            slot: Slot(config.slot),
            flag_key: config.flag_key(),
            focus_on_prompt: config.focus_on_prompt.clone(),
            focus_on_finish: config.focus_on_finish.clone(),
            text: config.text.clone(),
            timing: config.timing,
            provider,
            surface,
            store,
            inbox,
            session: SignInSession::new(),
            prompt: PromptPhase::Hidden,
            animator: Animator::new(config.timing.animation_phase()),
            tasks: TaskSeq::default(),
            callbacks_live: false,
            pending_requests: 0,
            decision: None,
            snapshot,
        }
    }

    // ------------------------------------------------------------------
    // Observables
    // ------------------------------------------------------------------

    pub fn is_signed_in(&self) -> bool {
        self.session.is_signed_in()
    }

    pub fn current_identity(&self) -> Option<&UserIdentity> {
        self.session.identity()
    }

    /// Check this before allowing any other UI interaction.
    pub fn prompt_closed(&self) -> bool {
        self.session.prompt_closed()
    }

    pub fn session(&self) -> &SignInSession {
        &self.session
    }

    pub fn is_prompt_visible(&self) -> bool {
        !matches!(self.prompt, PromptPhase::Hidden)
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    pub fn callbacks_live(&self) -> bool {
        self.callbacks_live
    }

    /// Nothing in flight: no outstanding request, animation or prompt hide.
    pub fn is_idle(&self) -> bool {
        self.pending_requests == 0
            && !self.animator.is_active()
            && !matches!(self.prompt, PromptPhase::Closing { .. })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            signed_in: self.session.is_signed_in(),
            display_name: self.session.identity().map(|i| i.display_name.clone()),
            prompt_closed: self.session.prompt_closed(),
            prompt_visible: self.is_prompt_visible(),
            animating: self.animator.is_active(),
        }
    }

    /// Receives a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.snapshot());
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    /// Registers the provider callbacks and makes the startup decision.
    ///
    /// Only the first call has any effect.
    pub fn start(&mut self) -> StartupDecision {
        if let Some(decision) = self.decision {
            tracing::warn!(?decision, "sign-in controller already started");
            return decision;
        }

        match self.register_callbacks() {
            Ok(()) => self.callbacks_live = true,
            Err(e) => {
                tracing::error!(error = %e, "failed to register sign-in callbacks; continuing without live updates");
            }
        }

        let signed_in_before = self.store.get_bool(&self.flag_key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, key = %self.flag_key, "failed to read sign-in flag; assuming first run");
            false
        });
        tracing::debug!(
            prompt_on_start = self.prompt_on_start,
            signed_in_before,
            "startup decision inputs"
        );

        let decision = if self.prompt_on_start && !signed_in_before {
            self.open_prompt();
            StartupDecision::PromptShown
        } else if signed_in_before {
            self.session.mark_prompt_closed();
            self.begin_sign_in();
            StartupDecision::AutoSignIn
        } else {
            self.session.mark_prompt_closed();
            StartupDecision::Idle
        };

        self.decision = Some(decision);
        self.publish();
        decision
    }

    /// Wires the provider's sign-out and sign-in callbacks to the inbox.
    ///
    /// # Errors
    /// Returns the provider error if either registration fails.
    fn register_callbacks(&self) -> Result<(), ProviderError> {
        let tx = self.inbox.clone();
        let on_sign_out: AuthCallback = Arc::new(move |outcome| {
            let _ = tx.send(SigninEvent::SignOut(outcome));
        });
        self.provider.on_player_sign_out(self.slot, on_sign_out)?;

        let tx = self.inbox.clone();
        let on_sign_in: AuthCallback = Arc::new(move |outcome| {
            let _ = tx.send(SigninEvent::SignIn(outcome));
        });
        self.provider.on_player_sign_in(self.slot, on_sign_in)
    }

    fn open_prompt(&mut self) {
        self.surface.set_prompt_visible(true);
        self.surface.fire_transition(Transition::Open);
        self.surface.set_corner_interactable(false);
        self.surface.focus(&self.focus_on_prompt);
        self.prompt = PromptPhase::Open;
    }

    // ------------------------------------------------------------------
    // User operations
    // ------------------------------------------------------------------

    pub fn dispatch(&mut self, action: UiAction) {
        match action {
            UiAction::SignInButton => self.sign_in_button(),
            UiAction::NoThanks => self.no_thanks(),
            UiAction::SignOut => self.request_sign_out(),
        }
    }

    /// Corner and prompt sign-in button.
    ///
    /// Signed in: asks the provider to switch users and waits for its callback.
    pub fn sign_in_button(&mut self) {
        if self.session.is_signed_in() {
            tracing::debug!(slot = %self.slot, "requesting user switch");
            self.provider.switch_user(self.slot);
            self.track_request();
        } else {
            self.begin_sign_in();
        }
        self.publish();
    }

    /// "No thanks" on the prompt.
    pub fn no_thanks(&mut self) {
        self.close_prompt();
        self.publish();
    }

    /// Asks the provider to sign out. State changes when the callback arrives.
    pub fn request_sign_out(&mut self) {
        if !self.session.is_signed_in() {
            tracing::debug!("sign-out requested while signed out; ignoring");
            return;
        }
        self.provider.sign_out(self.slot);
        self.track_request();
        self.publish();
    }

    fn begin_sign_in(&mut self) {
        tracing::debug!(slot = %self.slot, "requesting sign-in");
        self.provider.sign_in(self.slot);
        self.track_request();

        self.surface
            .set_corner_label(&format!("{}...", self.text.signing_in));
        let id = self.tasks.next_id();
        self.animator.start(id, &self.text.signing_in, &self.inbox);
    }

    fn track_request(&mut self) {
        if self.callbacks_live {
            self.pending_requests += 1;
        }
    }

    /// Closes the prompt if it is open. Returns whether anything happened.
    fn close_prompt(&mut self) -> bool {
        if self.prompt != PromptPhase::Open {
            tracing::debug!(phase = ?self.prompt, "prompt not open; skipping close");
            return false;
        }

        self.surface.set_corner_interactable(true);
        self.session.mark_prompt_closed();
        if let Some(control) = &self.focus_on_finish {
            self.surface.focus(control);
        }
        self.surface.fire_transition(Transition::Close);

        let task = self.tasks.next_id();
        let settle = self.timing.prompt_settle();
        let tx = self.inbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            let _ = tx.send(SigninEvent::PromptSettled { task });
        });
        self.prompt = PromptPhase::Closing { task };
        true
    }

    // ------------------------------------------------------------------
    // Inbox events
    // ------------------------------------------------------------------

    /// Applies one inbox event. Never fails; callback errors are logged.
    pub fn handle_event(&mut self, event: SigninEvent) {
        match event {
            SigninEvent::SignIn(outcome) => {
                self.finish_request();
                if let Err(e) = self.on_sign_in(outcome) {
                    tracing::error!(error = %e, "sign-in callback failed");
                }
            }
            SigninEvent::SignOut(outcome) => {
                self.finish_request();
                self.on_sign_out(outcome);
            }
            SigninEvent::AnimationFrame { task, text, .. } => {
                if self.animator.is_current(task) {
                    self.surface.set_corner_label(&text);
                }
                return;
            }
            SigninEvent::PromptSettled { task } => {
                if self.prompt == (PromptPhase::Closing { task }) {
                    self.surface.set_prompt_visible(false);
                    self.prompt = PromptPhase::Hidden;
                }
            }
        }
        self.publish();
    }

    fn finish_request(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
    }

    fn on_sign_in(&mut self, outcome: AuthOutcome) -> Result<(), CallbackError> {
        self.animator.stop();
        tracing::info!(status = %outcome.status, "signed in");

        let result = match (outcome.status, outcome.identity) {
            (AuthStatus::Succeeded, Some(identity)) => {
                if let Err(e) = self.store.set_bool(&self.flag_key, true) {
                    tracing::error!(error = %e, key = %self.flag_key, "failed to persist sign-in flag");
                }
                self.surface.set_corner_label(&format!(
                    "{}{}",
                    self.text.signed_in_as, identity.display_name
                ));
                self.session.sign_in(identity);
                Ok(())
            }
            (AuthStatus::Succeeded, None) => Err(CallbackError::MissingIdentity {
                status: AuthStatus::Succeeded,
            }),
            (status, _) => {
                if let Some(error) = &outcome.error {
                    tracing::warn!(%status, %error, "sign-in did not succeed");
                }
                Ok(())
            }
        };

        let applied = result.is_ok() && outcome.status.is_success();
        if !applied && !self.session.is_signed_in() {
            self.surface.set_corner_label(&self.text.sign_in_prompt);
        }

        if self.prompt == PromptPhase::Open {
            self.close_prompt();
        }
        result
    }

    fn on_sign_out(&mut self, outcome: AuthOutcome) {
        tracing::info!(status = %outcome.status, "signed out");
        if outcome.status.is_success() {
            self.session.sign_out();
            self.surface.set_corner_label(&self.text.sign_in_prompt);
        } else if let Some(error) = &outcome.error {
            tracing::warn!(status = %outcome.status, %error, "sign-out did not succeed");
        }
    }

    /// Stops the animation. Used when the host shuts down.
    pub fn shutdown(&mut self) {
        if self.animator.stop() {
            tracing::debug!("stopped sign-in animation on shutdown");
        }
        self.publish();
    }
}
