//! Interactive sign-in session.
//!
//! Wires the file flag store, the simulated provider and the terminal surface
//! into a `SigninRuntime`, then feeds it actions read from stdin until EOF or
//! `quit`.

use std::sync::Arc;

use anyhow::Result;
use playgate_core::config::Config;
use playgate_core::controller::{Collaborators, StartupDecision};
use playgate_core::events::UiAction;
use playgate_core::logging;
use playgate_core::provider::simulated::SimulatedProvider;
use playgate_core::runtime::{ActionSender, SigninRuntime};
use playgate_core::store::{FileFlagStore, FlagStore, MemoryFlagStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::surface::TerminalSurface;

const HELP: &str = "actions: s = sign in / switch user, n = no thanks, o = sign out, q = quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Action(UiAction),
    Quit,
    Help,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "sign-in" | "signin" => Some(Input::Action(UiAction::SignInButton)),
        "n" | "no" | "no-thanks" => Some(Input::Action(UiAction::NoThanks)),
        "o" | "sign-out" | "signout" => Some(Input::Action(UiAction::SignOut)),
        "q" | "quit" | "exit" => Some(Input::Quit),
        "?" | "h" | "help" => Some(Input::Help),
        _ => None,
    }
}

fn open_store() -> Box<dyn FlagStore> {
    match FileFlagStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::error!(error = %e, "flag store unavailable; sign-in state will not persist");
            Box::new(MemoryFlagStore::new())
        }
    }
}

async fn read_actions(tx: ActionSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_input(&line) {
            Some(Input::Action(action)) => {
                if tx.send(action).is_err() {
                    break;
                }
            }
            Some(Input::Quit) => break,
            Some(Input::Help) => println!("{HELP}"),
            None => eprintln!("unknown action {:?}; {HELP}", line.trim()),
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    let _log_guard = logging::init(config.debug)?;

    let collaborators = Collaborators {
        provider: Arc::new(SimulatedProvider::new(&config.simulation)),
        surface: Box::new(TerminalSurface),
        store: open_store(),
    };
    let mut runtime = SigninRuntime::new(&config, collaborators);

    match runtime.start() {
        StartupDecision::PromptShown => println!("{HELP}"),
        StartupDecision::AutoSignIn => tracing::debug!("signing in with previous account"),
        StartupDecision::Idle => tracing::debug!("prompt disabled; waiting for input"),
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let reader = tokio::spawn(read_actions(tx));
    runtime.run(rx, config.timing.shutdown_grace()).await;
    let _ = reader.await;

    let controller = runtime.controller();
    match controller.current_identity() {
        Some(identity) => println!("[session] signed in as {}", identity.display_name),
        None => println!("[session] not signed in"),
    }
    println!(
        "[session] prompt closed: {}",
        if controller.prompt_closed() { "yes" } else { "no" }
    );
    Ok(())
}
