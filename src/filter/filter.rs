use serde::{Deserialize, Serialize};

use super::error::FilterError;
use super::types::{PriorityFilter, StatusFilter};
use crate::database::models::{Project, ProjectPriority, ProjectStatus};

const MAX_SEARCH_LENGTH: usize = 200;

/// Raw query-string form, e.g. `?search=redesign&status=In%20Progress&priority=All`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Search plus status and priority constraints over a project list.
///
/// The search term matches case-insensitively against the title or the
/// description; an empty term matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub priority: PriorityFilter,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    pub fn priority(mut self, priority: ProjectPriority) -> Self {
        self.priority = PriorityFilter::Only(priority);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.status.is_all() && self.priority.is_all()
    }

    pub fn matches(&self, project: &Project) -> bool {
        self.matches_search(project)
            && self.status.accepts(&project.status)
            && self.priority.accepts(&project.priority)
    }

    fn matches_search(&self, project: &Project) -> bool {
        // The term is used as typed; only the empty string matches everything
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        project.title.to_lowercase().contains(&needle)
            || project
                .description
                .as_deref()
                .map_or(false, |d| d.to_lowercase().contains(&needle))
    }

    /// Borrowing filter; keeps the input order
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }

    pub fn apply_owned(&self, projects: Vec<Project>) -> Vec<Project> {
        if self.is_empty() {
            return projects;
        }
        projects.into_iter().filter(|p| self.matches(p)).collect()
    }

    /// Query-string pairs for the HTTP list endpoint; unconstrained fields are omitted
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if !self.status.is_all() {
            pairs.push(("status", self.status.to_string()));
        }
        if !self.priority.is_all() {
            pairs.push(("priority", self.priority.to_string()));
        }
        pairs
    }
}

impl TryFrom<ProjectQuery> for ProjectFilter {
    type Error = FilterError;

    fn try_from(query: ProjectQuery) -> Result<Self, Self::Error> {
        let search = query.search.unwrap_or_default();
        let length = search.chars().count();
        if length > MAX_SEARCH_LENGTH {
            return Err(FilterError::SearchTooLong(length));
        }

        let status = match query.status.as_deref() {
            Some(raw) => StatusFilter::parse(raw).map_err(|_| FilterError::InvalidStatus(raw.to_string()))?,
            None => StatusFilter::All,
        };
        let priority = match query.priority.as_deref() {
            Some(raw) => PriorityFilter::parse(raw).map_err(|_| FilterError::InvalidPriority(raw.to_string()))?,
            None => PriorityFilter::All,
        };

        Ok(Self { search, status, priority })
    }
}
