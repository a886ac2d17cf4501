use super::MediaCommandService;
use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, MediaFileDto},
        error::{ApplicationError, ApplicationResult},
        unit_of_work::UnitOfWork,
    },
    domain::{
        article::ArticleId,
        media::{MediaFile, MediaFileId, NewMediaFile},
        project::ProjectId,
        ids::UserId,
    },
};
use uuid::Uuid;

pub struct UploadMediaCommand {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub article_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub uploaded_by: Option<Uuid>,
}

/// Re-point a file at an article and/or project. `None` detaches.
pub struct AttachMediaCommand {
    pub id: Uuid,
    pub article_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

pub struct DeleteMediaCommand {
    pub id: Uuid,
}

async fn ensure_owners_exist(
    uow: &UnitOfWork,
    article_id: Option<ArticleId>,
    project_id: Option<ProjectId>,
) -> ApplicationResult<()> {
    if let Some(id) = article_id {
        uow.articles().get_by_id(id).await?;
    }
    if let Some(id) = project_id {
        uow.projects().get_by_id(id).await?;
    }
    Ok(())
}

impl MediaCommandService {
    /// Hand the bytes to storage, then record the metadata. If the metadata
    /// write fails the stored bytes are removed again.
    pub async fn upload_media(
        &self,
        audience: Audience,
        command: UploadMediaCommand,
    ) -> ApplicationResult<MediaFileDto> {
        ensure_staff(audience, "upload media")?;
        let UploadMediaCommand {
            original_name,
            content_type,
            bytes,
            article_id,
            project_id,
            uploaded_by,
        } = command;
        let article_id = article_id.map(ArticleId::from);
        let project_id = project_id.map(ProjectId::from);
        let uow = self.unit_of_work();
        ensure_owners_exist(&uow, article_id, project_id).await?;

        let size_bytes = i64::try_from(bytes.len())
            .map_err(|_| ApplicationError::validation("file is too large"))?;
        let stored = self
            .storage
            .store(&original_name, &content_type, bytes)
            .await?;

        let attempt = async {
            let file = MediaFile::register(
                NewMediaFile {
                    stored_name: stored.stored_name.clone(),
                    original_name,
                    content_type,
                    size_bytes,
                    url: stored.url.clone(),
                    article_id,
                    project_id,
                    uploaded_by: uploaded_by.map(UserId::from),
                },
                self.clock.now(),
            )?;
            let file = uow.media().add(file).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(file)
        }
        .await;

        let file = match attempt {
            Ok(file) => file,
            Err(err) => {
                if let Err(cleanup) = self.storage.remove(&stored.stored_name).await {
                    tracing::warn!(
                        stored_name = %stored.stored_name,
                        error = %cleanup,
                        "could not remove bytes after failed registration"
                    );
                }
                return Err(self.fail("upload_media", err));
            }
        };

        self.record("MediaUploaded", &file);
        Ok(file.into())
    }

    pub async fn attach_media(
        &self,
        audience: Audience,
        command: AttachMediaCommand,
    ) -> ApplicationResult<MediaFileDto> {
        ensure_staff(audience, "attach media")?;
        let article_id = command.article_id.map(ArticleId::from);
        let project_id = command.project_id.map(ProjectId::from);
        let uow = self.unit_of_work();

        let attempt = async {
            ensure_owners_exist(&uow, article_id, project_id).await?;
            let media = uow.media();
            let mut file = media.get_by_id(MediaFileId::from(command.id)).await?;
            file.article_id = article_id;
            file.project_id = project_id;
            media.update(file.clone()).await?;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(file)
        }
        .await;

        let file = attempt.map_err(|err| self.fail("attach_media", err))?;
        self.record("MediaAttached", &file);
        Ok(file.into())
    }

    /// Removes the metadata first; the stored bytes are removed afterwards
    /// and a failure there is only logged.
    pub async fn delete_media(
        &self,
        audience: Audience,
        command: DeleteMediaCommand,
    ) -> ApplicationResult<()> {
        ensure_staff(audience, "delete media")?;
        let uow = self.unit_of_work();

        let attempt = async {
            let media = uow.media();
            let file = media.get_by_id(MediaFileId::from(command.id)).await?;
            media.delete_entity(&file).await;
            uow.save_changes().await?;
            Ok::<_, ApplicationError>(file)
        }
        .await;

        let file = attempt.map_err(|err| self.fail("delete_media", err))?;
        if let Err(err) = self.storage.remove(&file.stored_name).await {
            tracing::warn!(stored_name = %file.stored_name, error = %err, "stored bytes were not removed");
        }
        self.record("MediaDeleted", &file);
        Ok(())
    }
}
