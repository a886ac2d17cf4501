use std::sync::Arc;

use crate::{
    application::{
        commands::ensure_staff,
        dto::{Audience, MediaFileDto, Page},
        error::ApplicationResult,
        unit_of_work::UnitOfWork,
    },
    domain::{
        article::ArticleId,
        media::{MediaCategory, MediaFileColumn},
        persistence::{PageRequest, Predicate, Store},
    },
};
use uuid::Uuid;

pub struct MediaQueryService {
    store: Arc<dyn Store>,
}

impl MediaQueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    async fn page(
        &self,
        filter: Option<Predicate<MediaFileColumn>>,
        page: u32,
        page_size: u32,
    ) -> ApplicationResult<Page<MediaFileDto>> {
        let uow = self.unit_of_work();
        let media = uow.media();

        let mut request =
            PageRequest::new(page, page_size).order_by(MediaFileColumn::UploadedAt, false);
        if let Some(filter) = filter.clone() {
            request = request.with_filter(filter);
        }
        request.validate()?;

        let total = media.count(filter).await?;
        let items = media.get_paged(request).await?;
        Ok(Page::new(items, page, page_size, total).map(Into::into))
    }

    /// Newest first, optionally restricted to one category.
    pub async fn list_media(
        &self,
        audience: Audience,
        category: Option<MediaCategory>,
        page: u32,
        page_size: u32,
    ) -> ApplicationResult<Page<MediaFileDto>> {
        ensure_staff(audience, "browse media")?;
        let filter = category.map(|c| Predicate::eq(MediaFileColumn::Category, c));
        self.page(filter, page, page_size).await
    }

    pub async fn media_for_article(
        &self,
        audience: Audience,
        article_id: Uuid,
    ) -> ApplicationResult<Vec<MediaFileDto>> {
        ensure_staff(audience, "browse media")?;
        let files = self
            .unit_of_work()
            .media()
            .get_all_sorted(
                Some(Predicate::eq(
                    MediaFileColumn::ArticleId,
                    ArticleId::from(article_id),
                )),
                MediaFileColumn::UploadedAt,
                true,
            )
            .await?;
        Ok(files.into_iter().map(Into::into).collect())
    }

    /// Files attached to neither an article nor a project.
    pub async fn orphaned_media(
        &self,
        audience: Audience,
        page: u32,
        page_size: u32,
    ) -> ApplicationResult<Page<MediaFileDto>> {
        ensure_staff(audience, "browse media")?;
        let filter = Predicate::is_null(MediaFileColumn::ArticleId)
            .and(Predicate::is_null(MediaFileColumn::ProjectId));
        self.page(Some(filter), page, page_size).await
    }
}
