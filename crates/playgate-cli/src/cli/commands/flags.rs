//! Persisted flag command handlers.

use anyhow::{Context, Result};
use playgate_core::config::Config;
use playgate_core::store::{FileFlagStore, FlagStore};

pub fn status(config: &Config) -> Result<()> {
    let store = FileFlagStore::open_default().context("open flag store")?;
    let before = store
        .get_bool(&config.flag_key())
        .context("read sign-in flag")?;
    println!("signed in before: {}", if before { "yes" } else { "no" });
    Ok(())
}

pub fn reset(config: &Config) -> Result<()> {
    let mut store = FileFlagStore::open_default().context("open flag store")?;
    store
        .remove(&config.flag_key())
        .context("clear sign-in flag")?;
    println!("Cleared {} in {}", config.flag_key(), store.path().display());
    Ok(())
}
