// src/application/commands/articles/create.rs
use super::ArticleCommandService;
use crate::{
    application::{
        commands::{ensure_staff, tags::resolve_tags},
        dto::{ArticleDto, Audience},
        error::{ApplicationError, ApplicationResult, FieldErrors},
        queries::articles::article_dto,
    },
    domain::{
        article::{
            Article, ArticleContent, ArticleEvent, ArticleSlug, ArticleSummary, ArticleTitle,
            NewArticle, SeoMetadata,
        },
        errors::DomainResult,
        ids::UserId,
    },
};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct SeoInput {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

impl SeoInput {
    pub(super) fn into_metadata(self) -> DomainResult<SeoMetadata> {
        SeoMetadata::new(self.meta_title, self.meta_description, self.meta_keywords)
    }
}

pub struct CreateArticleCommand {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    /// Tag display names; unknown names create new tags.
    pub tags: Vec<String>,
    pub seo: SeoInput,
    pub author_id: Option<Uuid>,
    pub publish: bool,
}

impl CreateArticleCommand {
    pub fn builder() -> CreateArticleCommandBuilder {
        CreateArticleCommandBuilder::default()
    }
}

#[derive(Default)]
pub struct CreateArticleCommandBuilder {
    title: Option<String>,
    content: Option<String>,
    summary: Option<String>,
    tags: Vec<String>,
    seo: SeoInput,
    author_id: Option<Uuid>,
    publish: bool,
}

impl CreateArticleCommandBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    pub fn seo(mut self, seo: SeoInput) -> Self {
        self.seo = seo;
        self
    }

    pub fn author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }

    pub fn build(self) -> Result<CreateArticleCommand, &'static str> {
        Ok(CreateArticleCommand {
            title: self.title.ok_or("title is required")?,
            content: self.content.ok_or("content is required")?,
            summary: self.summary,
            tags: self.tags,
            seo: self.seo,
            author_id: self.author_id,
            publish: self.publish,
        })
    }
}

impl ArticleCommandService {
    /// Create an article, resolving its tags by name, in one transaction.
    pub async fn create_article(
        &self,
        audience: Audience,
        command: CreateArticleCommand,
    ) -> ApplicationResult<ArticleDto> {
        ensure_staff(audience, "create articles")?;
        let CreateArticleCommand {
            title,
            content,
            summary,
            tags: tag_names,
            seo,
            author_id,
            publish,
        } = command;

        let mut errors = FieldErrors::default();
        let title = errors.check("title", ArticleTitle::new(title));
        let content = errors.check("content", ArticleContent::new(content));
        let summary = errors.check("summary", ArticleSummary::parse(summary));
        let seo = errors.check("seo", seo.into_metadata());
        errors.into_result()?;
        let (Some(title), Some(content), Some(summary), Some(seo)) = (title, content, summary, seo)
        else {
            return Err(ApplicationError::validation("invalid article input"));
        };

        let now = self.clock.now();
        let uow = self.unit_of_work();
        uow.begin_transaction().await?;

        let attempt = async {
            let tags = resolve_tags(&uow, &self.slug_service, &tag_names, now).await?;
            let slug = self
                .slug_service
                .generate_article_slug(&uow.articles(), title.as_str(), None, now)
                .await?;

            let mut article = Article::draft(NewArticle {
                title,
                slug: ArticleSlug::new(slug)?,
                summary,
                content,
                seo,
                author_id: author_id.map(UserId::from),
                tag_ids: tags.iter().map(|tag| tag.id).collect(),
                created_at: now,
            });
            let mut events = vec![ArticleEvent::Created {
                id: article.id,
                at: now,
            }];
            if publish {
                events.push(article.publish(now));
            }

            let article = uow.articles().add(article).await?;
            uow.commit_transaction().await?;
            Ok::<_, ApplicationError>((article.id, events))
        }
        .await;

        let (id, events) = match attempt {
            Ok(done) => done,
            Err(err) => return Err(self.abandon(&uow, "create_article", err).await),
        };
        self.record(&events);

        let created = uow.articles().get_by_id(id).await?;
        Ok(article_dto(&uow, created).await?)
    }
}
