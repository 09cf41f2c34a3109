use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_json, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::client::{Access, ProjectBackend};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account and log in")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, env = "PTRACK_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "PTRACK_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, ctx: &mut CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { email, name, password } => {
            let mut dashboard = ctx.dashboard().await?;
            let session = dashboard.register(&email, &password, &name).await?;
            ctx.remember_session(Some(session.clone()))?;
            output_success(
                &ctx.output,
                &format!("Registered {} ({})", session.user.email, session.user.role),
                Some(json!({ "user": session.user })),
            )
        }
        AuthCommands::Login { email, password } => {
            let mut dashboard = ctx.dashboard().await?;
            let session = dashboard.login(&email, &password).await?;
            ctx.remember_session(Some(session.clone()))?;
            output_success(
                &ctx.output,
                &format!("Logged in as {} ({})", session.user.email, session.user.role),
                Some(json!({ "user": session.user, "expires_at": session.expires_at })),
            )
        }
        AuthCommands::Logout => {
            // Forget the local session first; the server may be unreachable
            let Some(session) = ctx.config.session.take() else {
                return output_success(&ctx.output, "Not logged in", None);
            };
            ctx.save()?;
            match ctx.backend() {
                Ok(backend) => {
                    if let Err(e) = backend.logout(&session.token).await {
                        tracing::warn!("Server did not confirm logout: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Skipping remote logout: {:#}", e),
            }
            output_success(&ctx.output, "Logged out", None)
        }
        AuthCommands::Whoami => {
            let dashboard = ctx.guarded(Access::Authenticated).await?;
            let Some(session) = dashboard.session() else {
                anyhow::bail!("Not logged in");
            };
            // Keep the refreshed profile from restore
            ctx.remember_session(Some(session.clone()))?;
            match ctx.output {
                OutputFormat::Json => output_json(&session.user),
                OutputFormat::Text => {
                    println!("{} <{}>", session.user.name, session.user.email);
                    println!("Role:    {}", session.user.role);
                    println!("Expires: {}", session.expires_at.format("%Y-%m-%d %H:%M UTC"));
                    Ok(())
                }
            }
        }
    }
}
