//! The API surface the presentation tier talks to. [`LocalContentApi`]
//! serves it in-process; [`crate::presentation::cache::CachedContentApi`]
//! puts the read-through cache in front of any implementation.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::{
    ApplicationResult,
    commands::{
        articles::{
            ChangeArticleStatusCommand, CreateArticleCommand, DeleteArticleCommand,
            UpdateArticleCommand,
        },
        comments::{ModerateCommentCommand, SubmitCommentCommand},
        projects::{CreateProjectCommand, DeleteProjectCommand, UpdateProjectCommand},
        tags::{CreateTagCommand, DeleteTagCommand, UpdateTagCommand},
    },
    dto::{
        ArticleDto, Audience, CommentDto, Page, ProjectDto, TagDto, TagWithCountDto,
    },
    queries::articles::{GetArticleByIdQuery, GetArticleBySlugQuery, ListArticlesQuery},
    services::ApplicationServices,
};

#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_articles(
        &self,
        audience: Audience,
        query: ListArticlesQuery,
    ) -> ApplicationResult<Page<ArticleDto>>;

    async fn get_article(&self, audience: Audience, id: Uuid) -> ApplicationResult<ArticleDto>;

    async fn get_article_by_slug(
        &self,
        audience: Audience,
        slug: &str,
    ) -> ApplicationResult<ArticleDto>;

    async fn create_article(
        &self,
        audience: Audience,
        command: CreateArticleCommand,
    ) -> ApplicationResult<ArticleDto>;

    async fn update_article(
        &self,
        audience: Audience,
        command: UpdateArticleCommand,
    ) -> ApplicationResult<ArticleDto>;

    async fn change_article_status(
        &self,
        audience: Audience,
        command: ChangeArticleStatusCommand,
    ) -> ApplicationResult<ArticleDto>;

    async fn delete_article(
        &self,
        audience: Audience,
        command: DeleteArticleCommand,
    ) -> ApplicationResult<()>;

    async fn list_tags(&self, audience: Audience) -> ApplicationResult<Vec<TagWithCountDto>>;

    async fn create_tag(
        &self,
        audience: Audience,
        command: CreateTagCommand,
    ) -> ApplicationResult<TagDto>;

    async fn update_tag(
        &self,
        audience: Audience,
        command: UpdateTagCommand,
    ) -> ApplicationResult<TagDto>;

    async fn delete_tag(&self, audience: Audience, command: DeleteTagCommand)
    -> ApplicationResult<()>;

    async fn list_projects(&self, audience: Audience) -> ApplicationResult<Vec<ProjectDto>>;

    async fn get_project(&self, audience: Audience, id: Uuid) -> ApplicationResult<ProjectDto>;

    async fn create_project(
        &self,
        audience: Audience,
        command: CreateProjectCommand,
    ) -> ApplicationResult<ProjectDto>;

    async fn update_project(
        &self,
        audience: Audience,
        command: UpdateProjectCommand,
    ) -> ApplicationResult<ProjectDto>;

    async fn delete_project(
        &self,
        audience: Audience,
        command: DeleteProjectCommand,
    ) -> ApplicationResult<()>;

    /// Public comment thread: approved comments only, oldest first.
    async fn approved_comments(&self, article_id: Uuid) -> ApplicationResult<Vec<CommentDto>>;

    async fn submit_comment(&self, command: SubmitCommentCommand)
    -> ApplicationResult<CommentDto>;

    async fn moderate_comment(
        &self,
        audience: Audience,
        command: ModerateCommentCommand,
    ) -> ApplicationResult<CommentDto>;
}

/// In-process [`ContentApi`] backed by the application services.
#[derive(Clone)]
pub struct LocalContentApi {
    services: Arc<ApplicationServices>,
}

impl LocalContentApi {
    pub fn new(services: Arc<ApplicationServices>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &ApplicationServices {
        &self.services
    }
}

#[async_trait]
impl ContentApi for LocalContentApi {
    async fn list_articles(
        &self,
        audience: Audience,
        query: ListArticlesQuery,
    ) -> ApplicationResult<Page<ArticleDto>> {
        self.services
            .article_queries
            .list_articles(audience, query)
            .await
    }

    async fn get_article(&self, audience: Audience, id: Uuid) -> ApplicationResult<ArticleDto> {
        self.services
            .article_queries
            .get_article(audience, GetArticleByIdQuery { id })
            .await
    }

    async fn get_article_by_slug(
        &self,
        audience: Audience,
        slug: &str,
    ) -> ApplicationResult<ArticleDto> {
        let query = GetArticleBySlugQuery {
            slug: slug.to_string(),
        };
        self.services
            .article_queries
            .get_article_by_slug(audience, query)
            .await
    }

    async fn create_article(
        &self,
        audience: Audience,
        command: CreateArticleCommand,
    ) -> ApplicationResult<ArticleDto> {
        self.services
            .article_commands
            .create_article(audience, command)
            .await
    }

    async fn update_article(
        &self,
        audience: Audience,
        command: UpdateArticleCommand,
    ) -> ApplicationResult<ArticleDto> {
        self.services
            .article_commands
            .update_article(audience, command)
            .await
    }

    async fn change_article_status(
        &self,
        audience: Audience,
        command: ChangeArticleStatusCommand,
    ) -> ApplicationResult<ArticleDto> {
        self.services
            .article_commands
            .change_status(audience, command)
            .await
    }

    async fn delete_article(
        &self,
        audience: Audience,
        command: DeleteArticleCommand,
    ) -> ApplicationResult<()> {
        self.services
            .article_commands
            .delete_article(audience, command)
            .await
    }

    async fn list_tags(&self, audience: Audience) -> ApplicationResult<Vec<TagWithCountDto>> {
        self.services.tag_queries.list_tags(audience).await
    }

    async fn create_tag(
        &self,
        audience: Audience,
        command: CreateTagCommand,
    ) -> ApplicationResult<TagDto> {
        self.services.tag_commands.create_tag(audience, command).await
    }

    async fn update_tag(
        &self,
        audience: Audience,
        command: UpdateTagCommand,
    ) -> ApplicationResult<TagDto> {
        self.services.tag_commands.update_tag(audience, command).await
    }

    async fn delete_tag(
        &self,
        audience: Audience,
        command: DeleteTagCommand,
    ) -> ApplicationResult<()> {
        self.services.tag_commands.delete_tag(audience, command).await
    }

    async fn list_projects(&self, audience: Audience) -> ApplicationResult<Vec<ProjectDto>> {
        self.services.project_queries.list_projects(audience).await
    }

    async fn get_project(&self, audience: Audience, id: Uuid) -> ApplicationResult<ProjectDto> {
        self.services.project_queries.get_project(audience, id).await
    }

    async fn create_project(
        &self,
        audience: Audience,
        command: CreateProjectCommand,
    ) -> ApplicationResult<ProjectDto> {
        self.services
            .project_commands
            .create_project(audience, command)
            .await
    }

    async fn update_project(
        &self,
        audience: Audience,
        command: UpdateProjectCommand,
    ) -> ApplicationResult<ProjectDto> {
        self.services
            .project_commands
            .update_project(audience, command)
            .await
    }

    async fn delete_project(
        &self,
        audience: Audience,
        command: DeleteProjectCommand,
    ) -> ApplicationResult<()> {
        self.services
            .project_commands
            .delete_project(audience, command)
            .await
    }

    async fn approved_comments(&self, article_id: Uuid) -> ApplicationResult<Vec<CommentDto>> {
        self.services
            .comment_queries
            .approved_comments_for_article(article_id)
            .await
    }

    async fn submit_comment(
        &self,
        command: SubmitCommentCommand,
    ) -> ApplicationResult<CommentDto> {
        self.services.comment_commands.submit_comment(command).await
    }

    async fn moderate_comment(
        &self,
        audience: Audience,
        command: ModerateCommentCommand,
    ) -> ApplicationResult<CommentDto> {
        self.services
            .comment_commands
            .moderate_comment(audience, command)
            .await
    }
}
