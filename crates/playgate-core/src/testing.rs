//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::controller::{Collaborators, SigninController};
use crate::events::{EventReceiver, SigninEvent};
use crate::provider::{AuthCallback, AuthOutcome, IdentityProvider, ProviderError, Slot};
use crate::store::MemoryFlagStore;
use crate::surface::{PresentationSurface, Transition};

#[derive(Debug)]
struct SurfaceLog {
    visible: bool,
    interactable: bool,
    transitions: Vec<Transition>,
    labels: Vec<String>,
    focused: Vec<String>,
    hides: usize,
}

impl Default for SurfaceLog {
    fn default() -> Self {
        Self {
            visible: false,
            interactable: true,
            transitions: Vec::new(),
            labels: Vec::new(),
            focused: Vec::new(),
            hides: 0,
        }
    }
}

/// Records every surface call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    fn log(&self) -> MutexGuard<'_, SurfaceLog> {
        self.log.lock().unwrap()
    }

    pub fn visible(&self) -> bool {
        self.log().visible
    }

    pub fn interactable(&self) -> bool {
        self.log().interactable
    }

    pub fn transitions(&self) -> Vec<Transition> {
        self.log().transitions.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.log().labels.clone()
    }

    /// Current corner label (empty before the first write).
    pub fn label(&self) -> String {
        self.log().labels.last().cloned().unwrap_or_default()
    }

    pub fn focused(&self) -> Vec<String> {
        self.log().focused.clone()
    }

    pub fn hides(&self) -> usize {
        self.log().hides
    }
}

impl PresentationSurface for RecordingSurface {
    fn set_prompt_visible(&mut self, visible: bool) {
        let mut log = self.log();
        if !visible {
            log.hides += 1;
        }
        log.visible = visible;
    }

    fn fire_transition(&mut self, transition: Transition) {
        self.log().transitions.push(transition);
    }

    fn set_corner_interactable(&mut self, interactable: bool) {
        self.log().interactable = interactable;
    }

    fn set_corner_label(&mut self, text: &str) {
        self.log().labels.push(text.to_string());
    }

    fn focus(&mut self, control: &str) {
        self.log().focused.push(control.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCall {
    SignIn(Slot),
    SignOut(Slot),
    SwitchUser(Slot),
}

#[derive(Default)]
struct ProviderLog {
    calls: Vec<ProviderCall>,
    on_sign_in: Option<AuthCallback>,
    on_sign_out: Option<AuthCallback>,
}

/// Provider whose results are resolved by the test. Clones share state.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    log: Arc<Mutex<ProviderLog>>,
    fail_registration: bool,
}

impl RecordingProvider {
    pub fn failing_registration() -> Self {
        Self {
            fail_registration: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.log.lock().unwrap().calls.clone()
    }

    /// Fires the registered sign-in callback.
    pub fn resolve_sign_in(&self, outcome: AuthOutcome) {
        let cb = self.log.lock().unwrap().on_sign_in.clone();
        cb.expect("sign-in callback registered")(outcome);
    }

    /// Fires the registered sign-out callback.
    pub fn resolve_sign_out(&self, outcome: AuthOutcome) {
        let cb = self.log.lock().unwrap().on_sign_out.clone();
        cb.expect("sign-out callback registered")(outcome);
    }

    fn record(&self, call: ProviderCall) {
        self.log.lock().unwrap().calls.push(call);
    }
}

impl IdentityProvider for RecordingProvider {
    fn sign_in(&self, slot: Slot) {
        self.record(ProviderCall::SignIn(slot));
    }

    fn sign_out(&self, slot: Slot) {
        self.record(ProviderCall::SignOut(slot));
    }

    fn switch_user(&self, slot: Slot) {
        self.record(ProviderCall::SwitchUser(slot));
    }

    fn on_player_sign_in(&self, _slot: Slot, callback: AuthCallback) -> Result<(), ProviderError> {
        if self.fail_registration {
            return Err(ProviderError::NotReady);
        }
        self.log.lock().unwrap().on_sign_in = Some(callback);
        Ok(())
    }

    fn on_player_sign_out(
        &self,
        _slot: Slot,
        callback: AuthCallback,
    ) -> Result<(), ProviderError> {
        if self.fail_registration {
            return Err(ProviderError::NotReady);
        }
        self.log.lock().unwrap().on_sign_out = Some(callback);
        Ok(())
    }
}

/// Controller wired to recording doubles, plus the inbox it posts to.
pub struct Harness {
    pub controller: SigninController,
    pub inbox: EventReceiver,
    pub surface: RecordingSurface,
    pub provider: RecordingProvider,
    pub store: MemoryFlagStore,
}

impl Harness {
    pub fn new(config: &Config, store: MemoryFlagStore) -> Self {
        Self::with_provider(config, store, RecordingProvider::default())
    }

    pub fn with_failing_registration(config: &Config, store: MemoryFlagStore) -> Self {
        Self::with_provider(config, store, RecordingProvider::failing_registration())
    }

    fn with_provider(config: &Config, store: MemoryFlagStore, provider: RecordingProvider) -> Self {
        let surface = RecordingSurface::default();
        let (tx, inbox) = mpsc::unbounded_channel();
        let controller = SigninController::new(
            config,
            Collaborators {
                provider: Arc::new(provider.clone()),
                surface: Box::new(surface.clone()),
                store: Box::new(store.clone()),
            },
            tx,
        );
        Self {
            controller,
            inbox,
            surface,
            provider,
            store,
        }
    }

    /// Applies every event already queued. Does not wait.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.controller.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next event and applies it.
    pub async fn next(&mut self) -> SigninEvent {
        let event = self.inbox.recv().await.expect("inbox closed");
        self.controller.handle_event(event.clone());
        event
    }

    /// Like `next`, but gives up after `limit`.
    pub async fn next_within(&mut self, limit: Duration) -> Option<SigninEvent> {
        match tokio::time::timeout(limit, self.inbox.recv()).await {
            Ok(Some(event)) => {
                self.controller.handle_event(event.clone());
                Some(event)
            }
            _ => None,
        }
    }

    /// Applies events until the prompt hide has been processed.
    pub async fn next_settled(&mut self) {
        while !matches!(self.next().await, SigninEvent::PromptSettled { .. }) {}
    }
}
