use clap::Subcommand;

use crate::cli::utils::{output_admin_stats, output_users};
use crate::cli::CliContext;
use crate::client::Access;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Statistics across every user's projects")]
    Stats,

    #[command(about = "List registered users")]
    Users,
}

pub async fn handle(cmd: AdminCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let dashboard = ctx.guarded(Access::Admin).await?;
    match cmd {
        AdminCommands::Stats => {
            let stats = dashboard.admin_stats().await?;
            output_admin_stats(&ctx.output, &stats)
        }
        AdminCommands::Users => {
            let users = dashboard.admin_users().await?;
            output_users(&ctx.output, &users)
        }
    }
}
