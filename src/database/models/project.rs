use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Category offered by default when a create request leaves it blank
pub const DEFAULT_CATEGORY: &str = "Web Development";

/// Categories suggested to clients. The field itself is free text.
pub const CATEGORY_SUGGESTIONS: &[&str] = &[
    "Web Development",
    "Mobile App",
    "Design",
    "Marketing",
    "Research",
    "Other",
];

const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    /// Accepts the display form ("In Progress") as well as snake and kebab
    /// spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_input(s).as_str() {
            "planning" => Ok(ProjectStatus::Planning),
            "in progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "on hold" => Ok(ProjectStatus::OnHold),
            _ => Err(ValidationError::new(
                "status",
                format!("Unknown status '{}'; expected one of Planning, In Progress, Completed, On Hold", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ProjectPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ProjectPriority {
    pub const ALL: [ProjectPriority; 4] = [
        ProjectPriority::Low,
        ProjectPriority::Medium,
        ProjectPriority::High,
        ProjectPriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectPriority::Low => "Low",
            ProjectPriority::Medium => "Medium",
            ProjectPriority::High => "High",
            ProjectPriority::Critical => "Critical",
        }
    }

    /// High and Critical both count towards the "high priority" statistic
    pub fn is_high(&self) -> bool {
        matches!(self, ProjectPriority::High | ProjectPriority::Critical)
    }
}

impl fmt::Display for ProjectPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProjectPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_input(s).as_str() {
            "low" => Ok(ProjectPriority::Low),
            "medium" => Ok(ProjectPriority::Medium),
            "high" => Ok(ProjectPriority::High),
            "critical" => Ok(ProjectPriority::Critical),
            _ => Err(ValidationError::new(
                "priority",
                format!("Unknown priority '{}'; expected one of Low, Medium, High, Critical", s),
            )),
        }
    }
}

fn normalize_enum_input(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', '-'], " ")
}

/// A tracked unit of work. `user_id` is the owner and never changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub category: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Stamp identity, owner and timestamps onto validated input.
    pub fn from_new(input: NewProject, owner: Uuid, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let input = input.normalized()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            category: input.category,
            user_id: owner,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Create payload. Identifier, owner and timestamps are not accepted here;
/// any such keys in the JSON body are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: ProjectPriority,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl NewProject {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: ProjectStatus::default(),
            priority: ProjectPriority::default(),
            category: default_category(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: ProjectPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Trim text fields and enforce the title rules.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let title = validate_title(&self.title)?;
        let category = match self.category.trim() {
            "" => default_category(),
            other => other.to_string(),
        };
        Ok(Self {
            title,
            description: normalize_description(self.description),
            status: self.status,
            priority: self.priority,
            category,
        })
    }
}

/// Partial update. Absent fields are left untouched. An empty description
/// clears it.
///
/// `expected_updated_at` opts into an optimistic check: the update is
/// rejected with a conflict when the stored record has moved on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ProjectPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl ProjectPatch {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.category.is_none()
    }

    /// Apply onto `project`, bumping `updated_at`. Validation happens before
    /// any field is written so a rejected patch leaves the record intact.
    pub fn apply(&self, project: &mut Project, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let category = match self.category.as_deref().map(str::trim) {
            Some("") => return Err(ValidationError::new("category", "Category cannot be empty")),
            other => other.map(str::to_string),
        };

        if let Some(title) = title {
            project.title = title;
        }
        if let Some(description) = &self.description {
            project.description = normalize_description(Some(description.clone()));
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(priority) = self.priority {
            project.priority = priority;
        }
        if let Some(category) = category {
            project.category = category;
        }
        project.updated_at = now.max(project.created_at);
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("title", "Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::new(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
        ));
    }
    Ok(title.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
