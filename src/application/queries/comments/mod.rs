use std::sync::Arc;

use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, CommentDto, Page},
        error::{ApplicationError, ApplicationResult},
        unit_of_work::UnitOfWork,
    },
    domain::{
        article::ArticleId,
        comment::{CommentColumn, CommentStatus},
        persistence::{PageRequest, Predicate, Store},
    },
};
use uuid::Uuid;

pub struct CommentQueryService {
    store: Arc<dyn Store>,
}

impl CommentQueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    /// Comments shown under an article, oldest first. The public only ever
    /// sees approved comments on published articles; staff see every status.
    pub async fn comments_for_article(
        &self,
        audience: Audience,
        article_id: Uuid,
    ) -> ApplicationResult<Vec<CommentDto>> {
        let article_id = ArticleId::from(article_id);
        let uow = self.unit_of_work();

        let article = uow.articles().find_by_id(article_id).await?;
        match article {
            Some(article) if audience.is_staff() || article.is_published() => {}
            _ => return Err(ApplicationError::not_found("article not found")),
        }

        let mut filter = Predicate::eq(CommentColumn::ArticleId, article_id);
        if !audience.is_staff() {
            filter = filter.and(Predicate::eq(CommentColumn::Status, CommentStatus::Approved));
        }

        let comments = uow
            .comments()
            .get_all_sorted(Some(filter), CommentColumn::SubmittedAt, true)
            .await?;
        Ok(comments
            .into_iter()
            .map(|comment| CommentDto::for_audience(comment, audience))
            .collect())
    }

    pub async fn approved_comments_for_article(
        &self,
        article_id: Uuid,
    ) -> ApplicationResult<Vec<CommentDto>> {
        self.comments_for_article(Audience::Public, article_id).await
    }

    /// Pending comments, oldest first.
    pub async fn moderation_queue(
        &self,
        audience: Audience,
        page: u32,
        page_size: u32,
    ) -> ApplicationResult<Page<CommentDto>> {
        ensure_staff(audience, "view the moderation queue")?;
        let uow = self.unit_of_work();
        let comments = uow.comments();

        let filter = Predicate::eq(CommentColumn::Status, CommentStatus::Pending);
        let request = PageRequest::new(page, page_size)
            .with_filter(filter.clone())
            .order_by(CommentColumn::SubmittedAt, true);
        request.validate()?;

        let total = comments.count(Some(filter)).await?;
        let items = comments.get_paged(request).await?;
        Ok(Page::new(items, page, page_size, total)
            .map(|comment| CommentDto::for_audience(comment, audience)))
    }
}
