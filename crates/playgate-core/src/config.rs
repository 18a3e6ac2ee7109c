//! Configuration management for playgate.
//!
//! Loads configuration from ${PLAYGATE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::provider::AuthStatus;

pub mod paths {
    //! Path resolution for playgate configuration and data files.
    //!
    //! PLAYGATE_HOME resolution order:
    //! 1. PLAYGATE_HOME environment variable (if set)
    //! 2. ~/.config/playgate (default)

    use std::path::PathBuf;

    /// Returns the playgate home directory.
    ///
    /// Checks PLAYGATE_HOME env var first, falls back to ~/.config/playgate.
    /// Uses the current directory when no home directory can be determined.
    pub fn playgate_home() -> PathBuf {
        if let Ok(home) = std::env::var("PLAYGATE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map_or_else(|| PathBuf::from("."), |h| h.join(".config").join("playgate"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        playgate_home().join("config.toml")
    }

    /// Returns the path to the persisted flag file.
    pub fn flags_path() -> PathBuf {
        playgate_home().join("flags.json")
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Locale-facing label templates for the corner sign-in control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Label stem while signing in. Dots are appended by the animator.
    pub signing_in: String,
    /// Label while not signed in.
    pub sign_in_prompt: String,
    /// Prefix placed before the display name while signed in.
    pub signed_in_as: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            signing_in: "Signing in".to_string(),
            sign_in_prompt: "Sign in to \nPlatform".to_string(),
            signed_in_as: "Signed in as: \n".to_string(),
        }
    }
}

/// Durations used by the animator, the prompt and the CLI shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub animation_phase_ms: u64,
    pub prompt_settle_ms: u64,
    pub shutdown_grace_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            animation_phase_ms: 500,
            prompt_settle_ms: 1000,
            shutdown_grace_ms: 5000,
        }
    }
}

impl TimingConfig {
    pub fn animation_phase(&self) -> Duration {
        Duration::from_millis(self.animation_phase_ms)
    }

    pub fn prompt_settle(&self) -> Duration {
        Duration::from_millis(self.prompt_settle_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Scripted provider behavior (used by the CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub latency_ms: u64,
    pub outcome: AuthStatus,
    pub display_name: String,
    pub fail_registration: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_ms: 800,
            outcome: AuthStatus::Succeeded,
            display_name: "Player1".to_string(),
            fail_registration: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Show the first-run sign-in prompt.
    pub prompt_on_start: bool,
    /// Verbose logging of controller decisions.
    pub debug: bool,
    /// Local user slot for every provider call.
    pub slot: u32,
    /// Namespace prefix of the persisted flag key.
    pub flag_namespace: String,
    /// Control focused when the prompt opens.
    pub focus_on_prompt: String,
    /// Control focused when the prompt closes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_on_finish: Option<String>,
    pub text: TextConfig,
    pub timing: TimingConfig,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_on_start: true,
            debug: false,
            slot: Self::DEFAULT_SLOT,
            flag_namespace: Self::DEFAULT_NAMESPACE.to_string(),
            focus_on_prompt: Self::DEFAULT_PROMPT_FOCUS.to_string(),
            focus_on_finish: None,
            text: TextConfig::default(),
            timing: TimingConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_SLOT: u32 = 1;
    pub const DEFAULT_NAMESPACE: &'static str = "playgate";
    pub const DEFAULT_PROMPT_FOCUS: &'static str = "copy_button";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Key under which the signed-in-before flag is persisted.
    pub fn flag_key(&self) -> String {
        format!("{}.SignedInBefore", self.flag_namespace)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.prompt_on_start);
        assert_eq!(config.text.signing_in, "Signing in");
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "prompt_on_start = false\n[text]\nsigning_in = \"Connexion\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(!config.prompt_on_start);
        assert_eq!(config.text.signing_in, "Connexion");
        assert_eq!(config.text.sign_in_prompt, "Sign in to \nPlatform");
        assert_eq!(config.timing.animation_phase_ms, 500);
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "prompt_on_start = \"maybe\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "# mine").unwrap();

        assert!(Config::init(&config_path).is_err());
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine");
    }

    #[test]
    fn test_flag_key_uses_namespace() {
        let config = Config {
            flag_namespace: "Studio.Game".to_string(),
            ..Config::default()
        };
        assert_eq!(config.flag_key(), "Studio.Game.SignedInBefore");
    }
}
