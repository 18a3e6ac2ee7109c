//! Serialized event loop around the controller.
//!
//! The runtime owns the `SigninController` and the receiving end of its inbox.
//! Provider callbacks, animator frames and prompt timers are drained from the
//! inbox; UI actions come from a second channel. Both are applied one at a time
//! on the task running `run`, so the controller needs no locking.

use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::config::Config;
use crate::controller::{Collaborators, SigninController, StartupDecision};
use crate::events::{EventReceiver, UiAction};
use crate::session::SessionSnapshot;

pub type ActionSender = mpsc::UnboundedSender<UiAction>;
pub type ActionReceiver = mpsc::UnboundedReceiver<UiAction>;

pub struct SigninRuntime {
    controller: SigninController,
    inbox_rx: EventReceiver,
}

impl SigninRuntime {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let controller = SigninController::new(config, collaborators, inbox_tx);
        Self {
            controller,
            inbox_rx,
        }
    }

    pub fn controller(&self) -> &SigninController {
        &self.controller
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.controller.subscribe()
    }

    pub fn start(&mut self) -> StartupDecision {
        self.controller.start()
    }

    pub fn dispatch(&mut self, action: UiAction) {
        tracing::debug!(?action, "ui action");
        self.controller.dispatch(action);
    }

    /// Applies every queued inbox event without waiting.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.inbox_rx.try_recv() {
            self.controller.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Runs until `actions` closes, then waits up to `grace` for in-flight
    /// work to finish before stopping the animation.
    pub async fn run(&mut self, mut actions: ActionReceiver, grace: Duration) {
        loop {
            tokio::select! {
                biased;
                Some(event) = self.inbox_rx.recv() => self.controller.handle_event(event),
                action = actions.recv() => match action {
                    Some(action) => self.dispatch(action),
                    None => break,
                },
            }
        }

        self.settle(grace).await;
        self.controller.shutdown();
    }

    /// Applies inbox events until the controller is idle or `grace` elapses.
    /// Returns whether the controller became idle.
    pub async fn settle(&mut self, grace: Duration) -> bool {
        let deadline = tokio::time::sleep(grace);
        tokio::pin!(deadline);

        while !self.controller.is_idle() {
            tokio::select! {
                Some(event) = self.inbox_rx.recv() => self.controller.handle_event(event),
                () = &mut deadline => {
                    tracing::warn!(?grace, "sign-in work still in flight at shutdown");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::provider::AuthStatus;
    use crate::provider::simulated::SimulatedProvider;
    use crate::store::{FlagStore, MemoryFlagStore};
    use crate::testing::RecordingSurface;

    const KEY: &str = "playgate.SignedInBefore";

    fn runtime(
        outcome: AuthStatus,
        store: &MemoryFlagStore,
        fail_registration: bool,
    ) -> (SigninRuntime, RecordingSurface) {
        let config = Config {
            simulation: SimulationConfig {
                latency_ms: 800,
                outcome,
                display_name: "Player1".to_string(),
                fail_registration,
            },
            ..Config::default()
        };
        let surface = RecordingSurface::default();
        let runtime = SigninRuntime::new(
            &config,
            Collaborators {
                provider: Arc::new(SimulatedProvider::new(&config.simulation)),
                surface: Box::new(surface.clone()),
                store: Box::new(store.clone()),
            },
        );
        (runtime, surface)
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_signs_in_and_settles() {
        let store = MemoryFlagStore::new();
        let (mut rt, surface) = runtime(AuthStatus::Succeeded, &store, false);
        assert_eq!(rt.start(), StartupDecision::PromptShown);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiAction::SignInButton).unwrap();
        drop(tx);
        rt.run(rx, Duration::from_secs(5)).await;

        let controller = rt.controller();
        assert!(controller.is_signed_in());
        assert!(controller.prompt_closed());
        assert!(!controller.is_prompt_visible());
        assert!(controller.is_idle());
        assert!(!surface.visible());
        assert_eq!(surface.label(), "Signed in as: \nPlayer1");
        assert!(store.get_bool(KEY).unwrap());

        // Animation frames were written while waiting on the provider.
        let labels = surface.labels();
        assert_eq!(labels[0], "Signing in...");
        assert!(labels.contains(&"Signing in".to_string()));
        assert!(labels.contains(&"Signing in.".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_launch_signs_in_automatically() {
        let store = MemoryFlagStore::with_flag(KEY, 1);
        let (mut rt, surface) = runtime(AuthStatus::Succeeded, &store, false);
        assert_eq!(rt.start(), StartupDecision::AutoSignIn);

        assert!(rt.settle(Duration::from_secs(5)).await);
        assert!(rt.controller().is_signed_in());
        assert!(surface.transitions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_sign_in_allows_retry() {
        let store = MemoryFlagStore::new();
        let (mut rt, surface) = runtime(AuthStatus::Failed, &store, false);
        rt.start();
        rt.dispatch(UiAction::SignInButton);

        assert!(rt.settle(Duration::from_secs(5)).await);
        assert!(!rt.controller().is_signed_in());
        assert!(rt.controller().prompt_closed());
        assert_eq!(surface.label(), "Sign in to \nPlatform");

        rt.dispatch(UiAction::SignInButton);
        assert!(rt.controller().is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_round_trip() {
        let store = MemoryFlagStore::with_flag(KEY, 1);
        let (mut rt, surface) = runtime(AuthStatus::Succeeded, &store, false);
        rt.start();
        assert!(rt.settle(Duration::from_secs(5)).await);

        rt.dispatch(UiAction::SignOut);
        assert!(rt.settle(Duration::from_secs(5)).await);
        assert!(!rt.controller().is_signed_in());
        assert_eq!(surface.label(), "Sign in to \nPlatform");
        // Signing out does not forget that the player signed in once.
        assert!(store.get_bool(KEY).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unready_provider_times_out_at_shutdown() {
        let store = MemoryFlagStore::with_flag(KEY, 1);
        let (mut rt, _surface) = runtime(AuthStatus::Succeeded, &store, true);
        assert_eq!(rt.start(), StartupDecision::AutoSignIn);

        // No callback ever arrives, so the animation keeps running.
        assert!(!rt.settle(Duration::from_secs(3)).await);
        assert!(rt.controller().is_animating());

        rt.controller.shutdown();
        assert!(!rt.controller().is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_prompt_closed() {
        let store = MemoryFlagStore::new();
        let (mut rt, _surface) = runtime(AuthStatus::Succeeded, &store, false);
        let mut snapshots = rt.subscribe();
        rt.start();
        assert!(!snapshots.borrow_and_update().prompt_closed);

        rt.dispatch(UiAction::NoThanks);
        assert!(snapshots.borrow_and_update().prompt_closed);
        assert_eq!(rt.drain(), 0);
    }
}
