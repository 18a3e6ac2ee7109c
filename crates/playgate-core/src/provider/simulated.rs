//! Scripted in-process identity provider.
//!
//! Every request resolves after a fixed latency with the configured outcome.
//! Requests must be issued from inside a tokio runtime.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use super::{AuthCallback, AuthOutcome, AuthStatus, IdentityProvider, ProviderError, Slot, UserIdentity};
use crate::config::SimulationConfig;

#[derive(Default)]
struct Registrations {
    sign_in: Option<(Slot, AuthCallback)>,
    sign_out: Option<(Slot, AuthCallback)>,
}

pub struct SimulatedProvider {
    latency: Duration,
    outcome: AuthStatus,
    display_name: String,
    fail_registration: bool,
    registrations: Mutex<Registrations>,
    current: Mutex<Option<UserIdentity>>,
    switches: Mutex<u32>,
}

impl SimulatedProvider {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            outcome: config.outcome,
            display_name: config.display_name.clone(),
            fail_registration: config.fail_registration,
            registrations: Mutex::new(Registrations::default()),
            current: Mutex::new(None),
            switches: Mutex::new(0),
        }
    }

    fn sign_in_callback(&self, slot: Slot) -> Option<AuthCallback> {
        let regs = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        regs.sign_in
            .as_ref()
            .filter(|(registered, _)| *registered == slot)
            .map(|(_, cb)| AuthCallback::clone(cb))
    }

    fn sign_out_callback(&self, slot: Slot) -> Option<AuthCallback> {
        let regs = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        regs.sign_out
            .as_ref()
            .filter(|(registered, _)| *registered == slot)
            .map(|(_, cb)| AuthCallback::clone(cb))
    }

    fn resolve_sign_in(&self, display_name: String) -> AuthOutcome {
        if !self.outcome.is_success() {
            return AuthOutcome::unsuccessful(
                self.outcome,
                format!("simulated sign-in {}", self.outcome),
            );
        }
        let identity = UserIdentity::new(display_name, Uuid::new_v4().to_string());
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        AuthOutcome::succeeded(identity)
    }

    fn deliver(&self, callback: Option<AuthCallback>, outcome: AuthOutcome) {
        let Some(callback) = callback else {
            tracing::debug!(status = %outcome.status, "no callback registered; dropping result");
            return;
        };
        let latency = self.latency;
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            callback(outcome);
        });
    }
}

impl IdentityProvider for SimulatedProvider {
    fn sign_in(&self, slot: Slot) {
        let outcome = self.resolve_sign_in(self.display_name.clone());
        self.deliver(self.sign_in_callback(slot), outcome);
    }

    fn sign_out(&self, slot: Slot) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let outcome = AuthOutcome {
            identity: previous,
            status: AuthStatus::Succeeded,
            error: None,
        };
        self.deliver(self.sign_out_callback(slot), outcome);
    }

    fn switch_user(&self, slot: Slot) {
        let n = {
            let mut switches = self.switches.lock().unwrap_or_else(PoisonError::into_inner);
            *switches += 1;
            *switches + 1
        };
        let outcome = self.resolve_sign_in(format!("{}-{n}", self.display_name));
        self.deliver(self.sign_in_callback(slot), outcome);
    }

    fn on_player_sign_in(&self, slot: Slot, callback: AuthCallback) -> Result<(), ProviderError> {
        if self.fail_registration {
            return Err(ProviderError::NotReady);
        }
        let mut regs = self
            .registrations
            .lock()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        if regs.sign_in.is_some() {
            return Err(ProviderError::AlreadyRegistered { slot });
        }
        regs.sign_in = Some((slot, callback));
        Ok(())
    }

    fn on_player_sign_out(
        &self,
        slot: Slot,
        callback: AuthCallback,
    ) -> Result<(), ProviderError> {
        if self.fail_registration {
            return Err(ProviderError::NotReady);
        }
        let mut regs = self
            .registrations
            .lock()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        if regs.sign_out.is_some() {
            return Err(ProviderError::AlreadyRegistered { slot });
        }
        regs.sign_out = Some((slot, callback));
        Ok(())
    }
}
