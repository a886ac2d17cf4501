use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::keys;
use super::store::ResponseCache;
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
    dto::{ArticleDto, Audience, CommentDto, Page, ProjectDto, TagDto, TagWithCountDto},
    queries::articles::ListArticlesQuery,
};
use crate::config::CacheConfig;
use crate::presentation::api::ContentApi;

/// Read-through cache in front of a [`ContentApi`].
///
/// Writes drop whole key families by prefix rather than tracking which list
/// pages a change touches, so another process's writes stay invisible here
/// until the TTL runs out.
pub struct CachedContentApi<A> {
    inner: A,
    cache: Arc<ResponseCache>,
    ttl: CacheConfig,
}

impl<A: ContentApi> CachedContentApi<A> {
    pub fn new(inner: A, cache: Arc<ResponseCache>, ttl: CacheConfig) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Failed fetches are returned as-is and never cached.
    async fn read_through<T, F, Fut>(&self, key: String, ttl: Duration, fetch: F) -> ApplicationResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ApplicationResult<T>> + Send,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            return Ok(hit);
        }
        let value = fetch().await?;
        self.cache.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Article changes show up in listings, details, and tag counts.
    fn forget_articles(&self) {
        let removed = self.cache.invalidate_prefix(keys::ARTICLE_LISTS)
            + self.cache.invalidate_prefix(keys::ARTICLE_DETAILS)
            + self.cache.invalidate_prefix(keys::TAG_LISTS);
        debug!(removed, "article cache entries invalidated");
    }

    fn forget_project(&self, id: Option<Uuid>) {
        let mut removed = self.cache.invalidate_prefix(keys::PROJECT_LISTS);
        if let Some(id) = id {
            removed += self.cache.invalidate_prefix(&keys::project_prefix(id));
        }
        debug!(removed, "project cache entries invalidated");
    }
}

#[async_trait]
impl<A: ContentApi> ContentApi for CachedContentApi<A> {
    async fn list_articles(
        &self,
        audience: Audience,
        query: ListArticlesQuery,
    ) -> ApplicationResult<Page<ArticleDto>> {
        let key = keys::article_list(audience, &query);
        self.read_through(key, self.ttl.article_ttl, || {
            self.inner.list_articles(audience, query)
        })
        .await
    }

    async fn get_article(&self, audience: Audience, id: Uuid) -> ApplicationResult<ArticleDto> {
        self.read_through(keys::article(audience, id), self.ttl.article_ttl, || {
            self.inner.get_article(audience, id)
        })
        .await
    }

    async fn get_article_by_slug(
        &self,
        audience: Audience,
        slug: &str,
    ) -> ApplicationResult<ArticleDto> {
        let key = keys::article_by_slug(audience, slug);
        self.read_through(key, self.ttl.article_ttl, || {
            self.inner.get_article_by_slug(audience, slug)
        })
        .await
    }

    async fn create_article(
        &self,
        audience: Audience,
        command: CreateArticleCommand,
    ) -> ApplicationResult<ArticleDto> {
        let created = self.inner.create_article(audience, command).await?;
        self.forget_articles();
        Ok(created)
    }

    async fn update_article(
        &self,
        audience: Audience,
        command: UpdateArticleCommand,
    ) -> ApplicationResult<ArticleDto> {
        let updated = self.inner.update_article(audience, command).await?;
        self.forget_articles();
        Ok(updated)
    }

    async fn change_article_status(
        &self,
        audience: Audience,
        command: ChangeArticleStatusCommand,
    ) -> ApplicationResult<ArticleDto> {
        let article_id = command.id;
        let changed = self.inner.change_article_status(audience, command).await?;
        self.forget_articles();
        // an unpublished article's thread is no longer public
        self.cache.invalidate(&keys::approved_comments(article_id));
        Ok(changed)
    }

    async fn delete_article(
        &self,
        audience: Audience,
        command: DeleteArticleCommand,
    ) -> ApplicationResult<()> {
        let article_id = command.id;
        self.inner.delete_article(audience, command).await?;
        self.forget_articles();
        self.cache.invalidate(&keys::approved_comments(article_id));
        Ok(())
    }

    async fn list_tags(&self, audience: Audience) -> ApplicationResult<Vec<TagWithCountDto>> {
        self.read_through(keys::tag_list(audience), self.ttl.tag_ttl, || {
            self.inner.list_tags(audience)
        })
        .await
    }

    async fn create_tag(
        &self,
        audience: Audience,
        command: CreateTagCommand,
    ) -> ApplicationResult<TagDto> {
        let created = self.inner.create_tag(audience, command).await?;
        self.cache.invalidate_prefix(keys::TAG_LISTS);
        Ok(created)
    }

    async fn update_tag(
        &self,
        audience: Audience,
        command: UpdateTagCommand,
    ) -> ApplicationResult<TagDto> {
        let updated = self.inner.update_tag(audience, command).await?;
        // articles embed their tags
        self.forget_articles();
        Ok(updated)
    }

    async fn delete_tag(
        &self,
        audience: Audience,
        command: DeleteTagCommand,
    ) -> ApplicationResult<()> {
        self.inner.delete_tag(audience, command).await?;
        self.forget_articles();
        Ok(())
    }

    async fn list_projects(&self, audience: Audience) -> ApplicationResult<Vec<ProjectDto>> {
        self.read_through(keys::project_list(audience), self.ttl.project_ttl, || {
            self.inner.list_projects(audience)
        })
        .await
    }

    async fn get_project(&self, audience: Audience, id: Uuid) -> ApplicationResult<ProjectDto> {
        self.read_through(keys::project(audience, id), self.ttl.project_ttl, || {
            self.inner.get_project(audience, id)
        })
        .await
    }

    async fn create_project(
        &self,
        audience: Audience,
        command: CreateProjectCommand,
    ) -> ApplicationResult<ProjectDto> {
        let created = self.inner.create_project(audience, command).await?;
        self.forget_project(None);
        Ok(created)
    }

    async fn update_project(
        &self,
        audience: Audience,
        command: UpdateProjectCommand,
    ) -> ApplicationResult<ProjectDto> {
        let id = command.id;
        let updated = self.inner.update_project(audience, command).await?;
        self.forget_project(Some(id));
        Ok(updated)
    }

    async fn delete_project(
        &self,
        audience: Audience,
        command: DeleteProjectCommand,
    ) -> ApplicationResult<()> {
        let id = command.id;
        self.inner.delete_project(audience, command).await?;
        self.forget_project(Some(id));
        Ok(())
    }

    async fn approved_comments(&self, article_id: Uuid) -> ApplicationResult<Vec<CommentDto>> {
        let key = keys::approved_comments(article_id);
        self.read_through(key, self.ttl.article_ttl, || {
            self.inner.approved_comments(article_id)
        })
        .await
    }

    /// New comments start out pending, so the public thread is unchanged.
    async fn submit_comment(
        &self,
        command: SubmitCommentCommand,
    ) -> ApplicationResult<CommentDto> {
        self.inner.submit_comment(command).await
    }

    async fn moderate_comment(
        &self,
        audience: Audience,
        command: ModerateCommentCommand,
    ) -> ApplicationResult<CommentDto> {
        let moderated = self.inner.moderate_comment(audience, command).await?;
        self.cache
            .invalidate(&keys::approved_comments(moderated.article_id));
        Ok(moderated)
    }
}
