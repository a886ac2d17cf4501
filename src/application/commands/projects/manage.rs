use super::ProjectCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, ProjectDto},
        error::{ApplicationError, ApplicationResult},
    },
    domain::{
        ids::ConcurrencyToken,
        project::{Project, ProjectDetails, ProjectId},
    },
};
use uuid::Uuid;

pub struct CreateProjectCommand {
    pub details: ProjectDetails,
}

pub struct UpdateProjectCommand {
    pub id: Uuid,
    pub version: ConcurrencyToken,
    pub details: ProjectDetails,
}

pub struct DeleteProjectCommand {
    pub id: Uuid,
    pub version: Option<ConcurrencyToken>,
}

impl ProjectCommandService {
    pub async fn create_project(
        &self,
        audience: Audience,
        command: CreateProjectCommand,
    ) -> ApplicationResult<ProjectDto> {
        ensure_staff(audience, "create projects")?;
        let project = Project::new(command.details, self.clock.now())?;
        let uow = self.unit_of_work();

        let attempt = async {
            let project = uow.projects().add(project).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(project.id)
        }
        .await;

        let id = attempt.map_err(|err| self.fail("create_project", err))?;
        self.record("ProjectCreated", id);
        Ok(uow.projects().get_by_id(id).await?.into())
    }

    pub async fn update_project(
        &self,
        audience: Audience,
        command: UpdateProjectCommand,
    ) -> ApplicationResult<ProjectDto> {
        ensure_staff(audience, "edit projects")?;
        let UpdateProjectCommand {
            id,
            version,
            details,
        } = command;
        let id = ProjectId::from(id);
        let uow = self.unit_of_work();

        let attempt = async {
            let projects = uow.projects();
            let mut project = projects.get_by_id(id).await?.with_expected_version(version);
            project.apply(details, self.clock.now())?;
            projects.update(project).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(())
        }
        .await;

        attempt.map_err(|err| self.fail("update_project", err))?;
        self.record("ProjectUpdated", id);
        Ok(uow.projects().get_by_id(id).await?.into())
    }

    /// Media attached to the project is kept with its project reference
    /// cleared.
    pub async fn delete_project(
        &self,
        audience: Audience,
        command: DeleteProjectCommand,
    ) -> ApplicationResult<()> {
        ensure_staff(audience, "delete projects")?;
        let id = ProjectId::from(command.id);
        let uow = self.unit_of_work();

        let attempt = async {
            let projects = uow.projects();
            let mut project = projects.get_by_id(id).await?;
            if let Some(version) = command.version {
                project = project.with_expected_version(version);
            }
            projects.delete_entity(&project).await;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(())
        }
        .await;

        attempt.map_err(|err| self.fail("delete_project", err))?;
        self.record("ProjectDeleted", id);
        Ok(())
    }
}
