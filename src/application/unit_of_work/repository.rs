use super::{Session, Staged};
use crate::domain::article::{Article, ArticleColumn};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::persistence::{
    Column, Entity, PageRequest, Predicate, Query, SortOrder, Window,
};
use crate::domain::slug::SlugLookup;
use crate::domain::tag::{Tag, TagColumn};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence gateway for one entity type.
///
/// Writes only stage changes on the owning unit of work. Lookups by id see
/// those staged changes; set queries read what the store (or the open
/// transaction) holds.
pub struct Repository<E> {
    session: Arc<Session>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub(super) fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    // column enums list their identity column first
    fn id_column() -> E::Column {
        E::Column::ALL[0]
    }

    pub async fn find_by_id(&self, id: E::Id) -> DomainResult<Option<E>> {
        let id: Uuid = id.into();
        match self.session.staged(E::KIND, id).await {
            Some(Staged::Add(record) | Staged::Update(record)) => {
                return E::from_record(record).map(Some);
            }
            Some(Staged::Delete { .. }) => return Ok(None),
            None => {}
        }

        let query = Query {
            filter: Some(Predicate::eq(Self::id_column(), id).erase()),
            order: None,
            window: Some(Window {
                offset: 0,
                limit: 1,
            }),
        };
        self.session
            .fetch(E::KIND, query)
            .await?
            .into_iter()
            .next()
            .map(E::from_record)
            .transpose()
    }

    pub async fn get_by_id(&self, id: E::Id) -> DomainResult<E> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("{} {id} not found", E::KIND)))
    }

    /// Every matching row, ordered by id. Unbounded; page large sets.
    pub async fn get_all(&self, filter: Option<Predicate<E::Column>>) -> DomainResult<Vec<E>> {
        let query = Query::filtered(filter.map(Predicate::erase));
        self.load(query).await
    }

    /// Like [`Repository::get_all`] but ordered by `column`, then id.
    pub async fn get_all_sorted(
        &self,
        filter: Option<Predicate<E::Column>>,
        column: E::Column,
        ascending: bool,
    ) -> DomainResult<Vec<E>> {
        let query = Query {
            filter: filter.map(Predicate::erase),
            order: Some(SortOrder {
                column: column.name(),
                ascending,
            }),
            window: None,
        };
        self.load(query).await
    }

    /// One page; a page past the end is empty rather than an error.
    pub async fn get_paged(&self, request: PageRequest<E::Column>) -> DomainResult<Vec<E>> {
        let query = request.into_query()?;
        self.load(query).await
    }

    pub async fn exists(&self, filter: Predicate<E::Column>) -> DomainResult<bool> {
        let query = Query {
            filter: Some(filter.erase()),
            order: None,
            window: Some(Window {
                offset: 0,
                limit: 1,
            }),
        };
        Ok(!self.session.fetch(E::KIND, query).await?.is_empty())
    }

    pub async fn count(&self, filter: Option<Predicate<E::Column>>) -> DomainResult<u64> {
        self.session
            .count(E::KIND, filter.map(Predicate::erase))
            .await
    }

    pub async fn add(&self, entity: E) -> DomainResult<E> {
        let record = entity.clone().into_record();
        self.session
            .with_changes(|changes| changes.stage_add(record))
            .await?;
        Ok(entity)
    }

    pub async fn add_range(&self, entities: impl IntoIterator<Item = E> + Send) -> DomainResult<()> {
        let records: Vec<_> = entities.into_iter().map(Entity::into_record).collect();
        self.session
            .with_changes(|changes| records.into_iter().try_for_each(|r| changes.stage_add(r)))
            .await
    }

    /// Stage the entity's current state. The concurrency token it carries is
    /// the one checked against the store on flush.
    pub async fn update(&self, entity: E) -> DomainResult<()> {
        let record = entity.into_record();
        self.session
            .with_changes(|changes| changes.stage_update(record))
            .await
    }

    pub async fn update_range(
        &self,
        entities: impl IntoIterator<Item = E> + Send,
    ) -> DomainResult<()> {
        let records: Vec<_> = entities.into_iter().map(Entity::into_record).collect();
        self.session
            .with_changes(|changes| {
                records
                    .into_iter()
                    .try_for_each(|r| changes.stage_update(r))
            })
            .await
    }

    /// Stage removal of the row with `id`, failing with `NotFound` when it
    /// does not exist.
    pub async fn delete(&self, id: E::Id) -> DomainResult<()> {
        let entity = self.get_by_id(id).await?;
        self.delete_entity(&entity).await;
        Ok(())
    }

    pub async fn delete_entity(&self, entity: &E) {
        let id: Uuid = entity.id().into();
        let token = entity.concurrency_token();
        self.session
            .with_changes(|changes| changes.stage_delete(E::KIND, id, token))
            .await;
    }

    pub async fn delete_range(&self, entities: &[E]) {
        let targets: Vec<(Uuid, _)> = entities
            .iter()
            .map(|e| (e.id().into(), e.concurrency_token()))
            .collect();
        self.session
            .with_changes(|changes| {
                for (id, token) in targets {
                    changes.stage_delete(E::KIND, id, token);
                }
            })
            .await;
    }

    async fn load(&self, query: Query) -> DomainResult<Vec<E>> {
        self.session
            .fetch(E::KIND, query)
            .await?
            .into_iter()
            .map(E::from_record)
            .collect()
    }
}

#[async_trait]
impl SlugLookup for Repository<Tag> {
    async fn slug_taken(&self, candidate: &str, ignore: Option<Uuid>) -> DomainResult<bool> {
        let mut filter = Predicate::eq_ignore_case(TagColumn::Slug, candidate);
        if let Some(id) = ignore {
            filter = filter.and(Predicate::ne(TagColumn::Id, id));
        }
        self.exists(filter).await
    }
}

#[async_trait]
impl SlugLookup for Repository<Article> {
    async fn slug_taken(&self, candidate: &str, ignore: Option<Uuid>) -> DomainResult<bool> {
        let mut filter = Predicate::eq_ignore_case(ArticleColumn::Slug, candidate);
        if let Some(id) = ignore {
            filter = filter.and(Predicate::ne(ArticleColumn::Id, id));
        }
        self.exists(filter).await
    }
}
