use crate::domain::ids::ConcurrencyToken;
use crate::domain::project::Project;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub display_order: i32,
    pub is_active: bool,
    pub completed_on: Option<NaiveDate>,
    pub repository_url: Option<String>,
    pub live_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: ConcurrencyToken,
}

impl From<Project> for ProjectDto {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.into(),
            version: project.version(),
            title: project.title,
            description: project.description,
            tech_stack: project.tech_stack,
            display_order: project.display_order,
            is_active: project.is_active,
            completed_on: project.completed_on,
            repository_url: project.repository_url,
            live_url: project.live_url,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}
