use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::CliContext;

#[derive(Subcommand)]
pub enum ThemeCommands {
    #[command(about = "Show the saved theme")]
    Show,

    #[command(about = "Switch between light and dark")]
    Toggle,
}

pub async fn handle(cmd: ThemeCommands, ctx: &mut CliContext) -> anyhow::Result<()> {
    match cmd {
        ThemeCommands::Show => output_success(
            &ctx.output,
            &format!("Theme: {}", ctx.config.theme),
            Some(json!({ "theme": ctx.config.theme })),
        ),
        ThemeCommands::Toggle => {
            let theme = ctx.config.theme.toggle();
            ctx.save()?;
            output_success(
                &ctx.output,
                &format!("Theme switched to {}", theme),
                Some(json!({ "theme": theme })),
            )
        }
    }
}
