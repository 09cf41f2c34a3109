use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::models::{Project, UserInfo};
use crate::filter::{AdminStats, ProjectStats};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn output_projects(output_format: &OutputFormat, projects: &[&Project]) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        return output_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    println!(
        "{:<36}  {:<30}  {:<11}  {:<8}  {:<16}  {}",
        "ID", "TITLE", "STATUS", "PRIORITY", "CATEGORY", "CREATED"
    );
    for p in projects {
        println!(
            "{:<36}  {:<30}  {:<11}  {:<8}  {:<16}  {}",
            p.id,
            truncate(&p.title, 30),
            p.status,
            p.priority,
            truncate(&p.category, 16),
            p.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub fn output_project(output_format: &OutputFormat, verb: &str, project: &Project) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(project),
        OutputFormat::Text => {
            println!("✓ {} project '{}' ({})", verb, project.title, project.id);
            println!("  Status:   {}", project.status);
            println!("  Priority: {}", project.priority);
            println!("  Category: {}", project.category);
            if let Some(description) = &project.description {
                println!("  {}", description);
            }
            Ok(())
        }
    }
}

pub fn output_stats(output_format: &OutputFormat, stats: &ProjectStats) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(stats),
        OutputFormat::Text => {
            println!("Total Projects: {}", stats.total);
            println!("Completed:      {}", stats.completed);
            println!("In Progress:    {}", stats.in_progress);
            println!("High Priority:  {}", stats.high_priority);
            Ok(())
        }
    }
}

pub fn output_admin_stats(output_format: &OutputFormat, stats: &AdminStats) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        return output_json(stats);
    }

    output_stats(output_format, &stats.totals)?;
    println!("Users:          {}", stats.user_count);
    for (title, counts) in [
        ("By status", &stats.by_status),
        ("By priority", &stats.by_priority),
        ("By category", &stats.by_category),
    ] {
        println!("\n{}:", title);
        for (key, count) in counts {
            println!("  {:<16} {}", key, count);
        }
    }
    println!("\nBy owner:");
    for owner in &stats.owners {
        let label = owner.email.clone().unwrap_or_else(|| owner.user_id.to_string());
        println!(
            "  {:<32} {} total, {} completed, {} high priority",
            label, owner.total, owner.completed, owner.high_priority
        );
    }
    Ok(())
}

pub fn output_users(output_format: &OutputFormat, users: &[UserInfo]) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        return output_json(&users);
    }
    for user in users {
        println!("{:<36}  {:<6}  {:<32}  {}", user.id, user.role, user.email, user.name);
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
