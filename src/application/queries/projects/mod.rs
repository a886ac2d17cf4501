use std::sync::Arc;

use crate::{
    application::{
        dto::{Audience, ProjectDto},
        error::{ApplicationError, ApplicationResult},
        unit_of_work::UnitOfWork,
    },
    domain::{
        persistence::{Predicate, Store},
        project::{ProjectColumn, ProjectId},
    },
};
use uuid::Uuid;

pub struct ProjectQueryService {
    store: Arc<dyn Store>,
}

impl ProjectQueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    /// Projects in display order; the public only sees active ones.
    pub async fn list_projects(&self, audience: Audience) -> ApplicationResult<Vec<ProjectDto>> {
        let filter = (!audience.is_staff()).then(|| Predicate::eq(ProjectColumn::IsActive, true));
        let projects = self
            .unit_of_work()
            .projects()
            .get_all_sorted(filter, ProjectColumn::DisplayOrder, true)
            .await?;
        Ok(projects.into_iter().map(Into::into).collect())
    }

    pub async fn get_project(&self, audience: Audience, id: Uuid) -> ApplicationResult<ProjectDto> {
        let project = self
            .unit_of_work()
            .projects()
            .find_by_id(ProjectId::from(id))
            .await?;
        match project {
            Some(project) if audience.is_staff() || project.is_active => Ok(project.into()),
            _ => Err(ApplicationError::not_found("project not found")),
        }
    }
}
