//! "Signing in" dot animation for the corner label.
//!
//! The animation runs as a spawned task that posts one `AnimationFrame` per
//! phase to the inbox. Cancellation is observed at every phase boundary.
//! The controller only applies frames from the currently active task, so a
//! stopped animation can never overwrite a newer label.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::events::{EventSender, SigninEvent};
use crate::task::{TaskId, TaskStarted, TaskState};

/// Number of phases in one animation cycle.
pub const PHASES: usize = 4;

/// Renders the label for every phase: no dots up to three dots.
pub fn frames(stem: &str) -> [String; PHASES] {
    [
        stem.to_string(),
        format!("{stem}."),
        format!("{stem}.."),
        format!("{stem}..."),
    ]
}

#[derive(Debug)]
pub struct Animator {
    phase: Duration,
    state: TaskState,
}

impl Animator {
    pub fn new(phase: Duration) -> Self {
        Self {
            phase,
            state: TaskState::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_running()
    }

    /// Whether frames from `id` should still be applied.
    pub fn is_current(&self, id: TaskId) -> bool {
        self.state.is_active(id)
    }

    /// Starts a new animation, stopping the previous one first.
    pub fn start(&mut self, id: TaskId, stem: &str, inbox: &EventSender) -> TaskStarted {
        if self.stop() {
            tracing::debug!("superseding running sign-in animation");
        }

        let started = TaskStarted {
            id,
            cancel: CancellationToken::new(),
        };
        self.state.on_started(&started);

        tokio::spawn(run(
            id,
            frames(stem),
            self.phase,
            started.cancel.clone(),
            inbox.clone(),
        ));
        started
    }

    /// Stops the active animation. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        self.state.cancel_active()
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    id: TaskId,
    frames: [String; PHASES],
    phase: Duration,
    cancel: CancellationToken,
    inbox: EventSender,
) {
    loop {
        for (index, text) in frames.iter().enumerate() {
            if cancel.is_cancelled() {
                return;
            }
            let frame = SigninEvent::AnimationFrame {
                task: id,
                phase: index,
                text: text.clone(),
            };
            if inbox.send(frame).is_err() {
                return;
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(phase) => {}
            }
        }
    }
}
