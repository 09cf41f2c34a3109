use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::{output_project, output_projects, output_stats, output_success};
use crate::cli::CliContext;
use crate::client::Access;
use crate::database::models::project::DEFAULT_CATEGORY;
use crate::database::models::{NewProject, ProjectPatch, ProjectPriority, ProjectStatus};
use crate::filter::{ProjectFilter, ProjectQuery};

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List visible projects, newest first")]
    List {
        #[arg(long, help = "Case-insensitive match on title or description")]
        search: Option<String>,
        #[arg(long, help = "Planning, \"In Progress\", Completed, \"On Hold\" or All")]
        status: Option<String>,
        #[arg(long, help = "Low, Medium, High, Critical or All")]
        priority: Option<String>,
    },

    #[command(about = "Create a project")]
    Add {
        #[arg(help = "Title")]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "Planning")]
        status: ProjectStatus,
        #[arg(long, default_value = "Medium")]
        priority: ProjectPriority,
        #[arg(long, default_value = DEFAULT_CATEGORY)]
        category: String,
    },

    #[command(about = "Change fields of a project")]
    Update {
        #[arg(help = "Project id")]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = "Pass an empty string to clear")]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        priority: Option<ProjectPriority>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, help = "Refuse the update if the project changed since this RFC 3339 timestamp")]
        expected_updated_at: Option<DateTime<Utc>>,
    },

    #[command(about = "Delete a project")]
    Delete {
        #[arg(help = "Project id")]
        id: Uuid,
    },

    #[command(about = "Totals, completed, in progress and high priority counts")]
    Stats,
}

pub async fn handle(cmd: ProjectCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let mut dashboard = ctx.guarded(Access::Authenticated).await?;

    match cmd {
        ProjectCommands::List { search, status, priority } => {
            let filter = ProjectFilter::try_from(ProjectQuery { search, status, priority })?;
            let projects = dashboard.projects().filtered(&filter);
            output_projects(&ctx.output, &projects)
        }
        ProjectCommands::Add {
            title,
            description,
            status,
            priority,
            category,
        } => {
            let mut input = NewProject::new(title).status(status).priority(priority).category(category);
            if let Some(description) = description {
                input = input.description(description);
            }
            let project = dashboard.projects_mut().create(input).await?;
            output_project(&ctx.output, "Created", project)
        }
        ProjectCommands::Update {
            id,
            title,
            description,
            status,
            priority,
            category,
            expected_updated_at,
        } => {
            let patch = ProjectPatch {
                title,
                description,
                status,
                priority,
                category,
                expected_updated_at,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update; pass at least one of --title, --description, --status, --priority, --category");
            }
            let project = dashboard.projects_mut().update(id, patch).await?;
            output_project(&ctx.output, "Updated", &project)
        }
        ProjectCommands::Delete { id } => {
            dashboard.projects_mut().delete(id).await?;
            output_success(&ctx.output, &format!("Deleted project {}", id), Some(json!({ "id": id })))
        }
        ProjectCommands::Stats => {
            let stats = dashboard.projects().stats();
            output_stats(&ctx.output, &stats)
        }
    }
}
