pub mod commands;
pub mod config;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::guard::{ACCESS_DENIED_MESSAGE, ACCESS_DENIED_TITLE};
use crate::client::{Access, Dashboard, GuardOutcome, HttpBackend, Session};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "ptrack")]
#[command(about = "ptrack - command-line dashboard for the project tracker API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "PTRACK_SERVER", help = "Server URL (saved for later runs)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Register, log in and out, show the current user")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List, create, update and delete projects")]
    Project {
        #[command(subcommand)]
        cmd: commands::project::ProjectCommands,
    },

    #[command(about = "Cross-user statistics and user directory (admin only)")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Show or toggle the light/dark theme preference")]
    Theme {
        #[command(subcommand)]
        cmd: commands::theme::ThemeCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Saved configuration plus the output format for one invocation
pub struct CliContext {
    pub config: CliConfig,
    pub config_path: PathBuf,
    pub output: OutputFormat,
}

impl CliContext {
    pub fn backend(&self) -> anyhow::Result<HttpBackend> {
        HttpBackend::new(&self.config.server_url)
            .with_context(|| format!("invalid server URL '{}'", self.config.server_url))
    }

    /// Dashboard over the configured server with the saved session resolved
    pub async fn dashboard(&self) -> anyhow::Result<Dashboard<HttpBackend>> {
        let mut dashboard = Dashboard::new(Arc::new(self.backend()?), self.config.theme);
        dashboard.restore(self.config.session.clone()).await?;
        Ok(dashboard)
    }

    /// Like [`CliContext::dashboard`] but fails unless the guard grants `access`
    pub async fn guarded(&self, access: Access) -> anyhow::Result<Dashboard<HttpBackend>> {
        let dashboard = self.dashboard().await?;
        match dashboard.guard(access) {
            GuardOutcome::Granted(_) => Ok(dashboard),
            GuardOutcome::AccessDenied => {
                anyhow::bail!("{}: {}", ACCESS_DENIED_TITLE, ACCESS_DENIED_MESSAGE)
            }
            GuardOutcome::Login | GuardOutcome::Loading => {
                anyhow::bail!("Not logged in. Run `ptrack auth login <email>` first")
            }
        }
    }

    pub fn remember_session(&mut self, session: Option<Session>) -> anyhow::Result<()> {
        self.config.session = session;
        self.save()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        config::save_to(&self.config_path, &self.config)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output = OutputFormat::from_cli(&cli);
    let config_path = config::config_path()?;
    let config = config::load_from(&config_path)?;
    let mut ctx = CliContext {
        config,
        config_path,
        output,
    };
    if let Some(server) = cli.server {
        if server != ctx.config.server_url {
            ctx.config.server_url = server;
            ctx.config.session = None;
            ctx.save()?;
        }
    }

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &mut ctx).await,
        Commands::Project { cmd } => commands::project::handle(cmd, &ctx).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, &ctx).await,
        Commands::Theme { cmd } => commands::theme::handle(cmd, &mut ctx).await,
    }
}
