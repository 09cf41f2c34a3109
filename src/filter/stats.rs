use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::database::models::{Project, ProjectStatus, UserInfo};

/// Dashboard counters over whatever set of projects the caller can see
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub high_priority: usize,
}

impl ProjectStats {
    pub fn from_projects<'a, I>(projects: I) -> Self
    where
        I: IntoIterator<Item = &'a Project>,
    {
        projects.into_iter().fold(Self::default(), |mut stats, p| {
            stats.total += 1;
            match p.status {
                ProjectStatus::Completed => stats.completed += 1,
                ProjectStatus::InProgress => stats.in_progress += 1,
                _ => {}
            }
            if p.priority.is_high() {
                stats.high_priority += 1;
            }
            stats
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerStats {
    pub user_id: Uuid,
    /// Absent when the owner account no longer resolves
    pub email: Option<String>,
    pub name: Option<String>,
    pub total: usize,
    pub completed: usize,
    pub high_priority: usize,
}

/// Cross-user breakdown for the admin view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub totals: ProjectStats,
    pub user_count: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Sorted by project count, busiest owner first
    pub owners: Vec<OwnerStats>,
}

impl AdminStats {
    pub fn compute(projects: &[Project], users: &[UserInfo]) -> Self {
        let mut by_status: BTreeMap<String, usize> =
            ProjectStatus::ALL.iter().map(|s| (s.to_string(), 0)).collect();
        let mut by_priority: BTreeMap<String, usize> = crate::database::models::ProjectPriority::ALL
            .iter()
            .map(|p| (p.to_string(), 0))
            .collect();
        let mut by_category = BTreeMap::new();
        let mut per_owner: HashMap<Uuid, Vec<&Project>> = HashMap::new();

        for p in projects {
            *by_status.entry(p.status.to_string()).or_insert(0) += 1;
            *by_priority.entry(p.priority.to_string()).or_insert(0) += 1;
            *by_category.entry(p.category.clone()).or_insert(0) += 1;
            per_owner.entry(p.user_id).or_default().push(p);
        }

        let directory: HashMap<Uuid, &UserInfo> = users.iter().map(|u| (u.id, u)).collect();
        let mut owners: Vec<OwnerStats> = per_owner
            .into_iter()
            .map(|(user_id, owned)| {
                let counts = ProjectStats::from_projects(owned.iter().copied());
                let user = directory.get(&user_id);
                OwnerStats {
                    user_id,
                    email: user.map(|u| u.email.clone()),
                    name: user.map(|u| u.name.clone()),
                    total: counts.total,
                    completed: counts.completed,
                    high_priority: counts.high_priority,
                }
            })
            .collect();
        owners.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.user_id.cmp(&b.user_id)));

        Self {
            totals: ProjectStats::from_projects(projects),
            user_count: users.len(),
            by_status,
            by_priority,
            by_category,
            owners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewProject, ProjectPriority, Role};
    use chrono::Utc;

    fn project(owner: Uuid, status: ProjectStatus, priority: ProjectPriority, category: &str) -> Project {
        Project::from_new(
            NewProject::new("p").status(status).priority(priority).category(category),
            owner,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn counters_follow_status_and_priority() {
        let owner = Uuid::new_v4();
        let projects = vec![
            project(owner, ProjectStatus::Completed, ProjectPriority::High, "Design"),
            project(owner, ProjectStatus::Completed, ProjectPriority::Low, "Design"),
            project(owner, ProjectStatus::InProgress, ProjectPriority::Critical, "Research"),
            project(owner, ProjectStatus::Planning, ProjectPriority::Medium, "Other"),
            project(owner, ProjectStatus::OnHold, ProjectPriority::High, "Other"),
        ];
        let stats = ProjectStats::from_projects(&projects);
        assert_eq!(
            stats,
            ProjectStats {
                total: 5,
                completed: 2,
                in_progress: 1,
                high_priority: 3,
            }
        );
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(ProjectStats::from_projects(&Vec::new()), ProjectStats::default());
    }

    #[test]
    fn admin_breakdown_groups_by_owner_and_category() {
        let alice = UserInfo {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            name: "Alice".into(),
            role: Role::User,
        };
        let bob = Uuid::new_v4();
        let projects = vec![
            project(alice.id, ProjectStatus::Completed, ProjectPriority::High, "Design"),
            project(alice.id, ProjectStatus::Planning, ProjectPriority::Low, "Design"),
            project(bob, ProjectStatus::InProgress, ProjectPriority::Medium, "Marketing"),
        ];

        let stats = AdminStats::compute(&projects, std::slice::from_ref(&alice));
        assert_eq!(stats.totals.total, 3);
        assert_eq!(stats.user_count, 1);
        assert_eq!(stats.by_category["Design"], 2);
        assert_eq!(stats.by_status["On Hold"], 0);
        assert_eq!(stats.by_priority["High"], 1);

        assert_eq!(stats.owners[0].user_id, alice.id);
        assert_eq!(stats.owners[0].email.as_deref(), Some("alice@example.com"));
        assert_eq!(stats.owners[0].completed, 1);
        assert_eq!(stats.owners[1].user_id, bob);
        assert_eq!(stats.owners[1].email, None);
    }
}
