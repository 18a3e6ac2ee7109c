//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use playgate_core::config;
use playgate_core::provider::AuthStatus;

mod commands;

#[derive(Parser)]
#[command(name = "playgate")]
#[command(version)]
#[command(about = "First-run platform sign-in gate")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides for a sign-in session.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Skip the first-run prompt
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,

    /// Outcome the simulated provider reports
    #[arg(long, value_enum)]
    pub outcome: Option<OutcomeArg>,

    /// Simulated provider latency in milliseconds
    #[arg(long, value_name = "MS")]
    pub latency_ms: Option<u64>,

    /// Display name the simulated provider signs in as
    #[arg(long)]
    pub display_name: Option<String>,

    /// Make callback registration fail (provider not ready)
    #[arg(long)]
    pub unready: bool,

    /// Log controller decisions
    #[arg(long)]
    pub debug: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeArg {
    Succeeded,
    Failed,
    Cancelled,
}

impl From<OutcomeArg> for AuthStatus {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Succeeded => AuthStatus::Succeeded,
            OutcomeArg::Failed => AuthStatus::Failed,
            OutcomeArg::Cancelled => AuthStatus::Cancelled,
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut config::Config) {
        if self.no_prompt {
            config.prompt_on_start = false;
        }
        if let Some(outcome) = self.outcome {
            config.simulation.outcome = outcome.into();
        }
        if let Some(latency) = self.latency_ms {
            config.simulation.latency_ms = latency;
        }
        if let Some(name) = &self.display_name {
            config.simulation.display_name.clone_from(name);
        }
        if self.unready {
            config.simulation.fail_registration = true;
        }
        if self.debug {
            config.debug = true;
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start a sign-in session (default). Reads actions from stdin
    Run(RunArgs),
    /// Show whether the player has signed in before
    Status,
    /// Forget the previous sign-in so the prompt shows again
    Reset,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;

    match cli.command {
        None => {
            RunArgs::default().apply(&mut config);
            commands::run::run(config).await
        }
        Some(Commands::Run(args)) => {
            args.apply(&mut config);
            commands::run::run(config).await
        }
        Some(Commands::Status) => commands::flags::status(&config),
        Some(Commands::Reset) => commands::flags::reset(&config),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
