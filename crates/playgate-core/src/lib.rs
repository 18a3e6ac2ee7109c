//! Platform sign-in gate: first-run prompt, asynchronous sign-in tracking and
//! "signing in" feedback for a single local player.

pub mod animator;
pub mod config;
pub mod controller;
pub mod events;
pub mod logging;
pub mod provider;
pub mod runtime;
pub mod session;
pub mod store;
pub mod surface;
pub mod task;

#[cfg(test)]
mod testing;
