//! Single-process store with the same integrity rules as the relational
//! schema: concurrency tokens, case-insensitive unique slugs, foreign keys,
//! cascades and set-null.

use crate::domain::article::Article;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::ConcurrencyToken;
use crate::domain::persistence::{
    ColumnName, EntityKind, FieldValue, Mutation, Predicate, Query, Record, Store, StoreProvider,
    StoreTransaction,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::column_exists;

#[derive(Debug, Clone, Default)]
struct Tables {
    rows: HashMap<EntityKind, HashMap<Uuid, Record>>,
    // identities owned by the surrounding application
    users: HashSet<Uuid>,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> impl Iterator<Item = &Record> {
        self.rows.get(&kind).into_iter().flat_map(HashMap::values)
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut HashMap<Uuid, Record> {
        self.rows.entry(kind).or_default()
    }

    fn contains(&self, kind: EntityKind, id: Uuid) -> bool {
        self.rows.get(&kind).is_some_and(|rows| rows.contains_key(&id))
    }

    fn fetch(&self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        let mut matched: Vec<Record> = self
            .table(kind)
            .filter(|record| matches(record, query.filter.as_ref()))
            .cloned()
            .collect();

        match &query.order {
            Some(order) => {
                if !column_exists(kind, order.column) {
                    return Err(DomainError::persistence(format!(
                        "unknown {kind} column `{}`",
                        order.column
                    )));
                }
                matched.sort_by(|a, b| {
                    sort_values(a.field(order.column), b.field(order.column), order.ascending)
                        .then_with(|| a.id().cmp(&b.id()))
                });
            }
            None => matched.sort_by_key(Record::id),
        }

        Ok(match query.window {
            Some(window) => matched
                .into_iter()
                .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
                .collect(),
            None => matched,
        })
    }

    fn count(&self, kind: EntityKind, filter: Option<&Predicate<ColumnName>>) -> u64 {
        self.table(kind).filter(|record| matches(record, filter)).count() as u64
    }

    /// Apply the batch to a copy and swap it in only when every mutation
    /// succeeded.
    fn apply(&mut self, mutations: &[Mutation]) -> DomainResult<u64> {
        let mut working = self.clone();
        let mut affected = 0;
        for mutation in mutations {
            affected += working.apply_one(mutation)?;
        }
        *self = working;
        Ok(affected)
    }

    fn apply_one(&mut self, mutation: &Mutation) -> DomainResult<u64> {
        match mutation {
            Mutation::Insert(record) => {
                let kind = record.kind();
                let id = record.id();
                if self.contains(kind, id) {
                    return Err(DomainError::persistence(format!(
                        "duplicate key: {kind} {id} already exists"
                    )));
                }
                self.check_constraints(record)?;
                let mut record = record.clone();
                if kind.is_versioned() {
                    record.assign_concurrency_token(ConcurrencyToken::fresh());
                }
                self.table_mut(kind).insert(id, record);
                Ok(1)
            }
            Mutation::Update(record) => {
                let kind = record.kind();
                let id = record.id();
                let stored = self
                    .rows
                    .get(&kind)
                    .and_then(|rows| rows.get(&id))
                    .ok_or_else(|| vanished(kind, id))?;
                if kind.is_versioned() && stored.concurrency_token() != record.concurrency_token() {
                    return Err(stale(kind, id));
                }
                self.check_constraints(record)?;
                let mut record = record.clone();
                if kind.is_versioned() {
                    record.assign_concurrency_token(ConcurrencyToken::fresh());
                }
                self.table_mut(kind).insert(id, record);
                Ok(1)
            }
            Mutation::Delete { kind, id, expected } => {
                let kind = *kind;
                let id = *id;
                let stored = self
                    .rows
                    .get(&kind)
                    .and_then(|rows| rows.get(&id))
                    .ok_or_else(|| vanished(kind, id))?;
                if let Some(expected) = expected {
                    if stored.concurrency_token() != Some(*expected) {
                        return Err(stale(kind, id));
                    }
                }
                self.table_mut(kind).remove(&id);
                self.cascade_delete(kind, id);
                Ok(1)
            }
        }
    }

    fn cascade_delete(&mut self, kind: EntityKind, id: Uuid) {
        match kind {
            EntityKind::Article => {
                self.table_mut(EntityKind::Comment).retain(|_, record| {
                    !matches!(record, Record::Comment(c) if c.article_id.as_uuid() == id)
                });
                for record in self.table_mut(EntityKind::MediaFile).values_mut() {
                    if let Record::MediaFile(file) = record {
                        if file.article_id.is_some_and(|a| a.as_uuid() == id) {
                            file.article_id = None;
                        }
                    }
                }
            }
            EntityKind::Tag => {
                for record in self.table_mut(EntityKind::Article).values_mut() {
                    if let Record::Article(article) = record {
                        article.detach_tag(id.into());
                    }
                }
            }
            EntityKind::Project => {
                for record in self.table_mut(EntityKind::MediaFile).values_mut() {
                    if let Record::MediaFile(file) = record {
                        if file.project_id.is_some_and(|p| p.as_uuid() == id) {
                            file.project_id = None;
                        }
                    }
                }
            }
            EntityKind::Comment | EntityKind::MediaFile => {}
        }
    }

    fn check_constraints(&self, record: &Record) -> DomainResult<()> {
        match record {
            Record::Article(article) => {
                let id = article.id.as_uuid();
                self.check_unique_slug(EntityKind::Article, id, article.slug.as_str())?;
                if let Some(author_id) = article.author_id {
                    self.require_user(author_id.as_uuid(), "articles_author_id_fkey")?;
                }
                check_article_tags(self, article)
            }
            Record::Tag(tag) => {
                self.check_unique_slug(EntityKind::Tag, tag.id.as_uuid(), tag.slug.as_str())
            }
            Record::Comment(comment) => self.require(
                EntityKind::Article,
                comment.article_id.as_uuid(),
                "comments_article_id_fkey",
            ),
            Record::MediaFile(file) => {
                if let Some(user_id) = file.uploaded_by {
                    self.require_user(user_id.as_uuid(), "media_files_uploaded_by_fkey")?;
                }
                if let Some(article_id) = file.article_id {
                    self.require(
                        EntityKind::Article,
                        article_id.as_uuid(),
                        "media_files_article_id_fkey",
                    )?;
                }
                if let Some(project_id) = file.project_id {
                    self.require(
                        EntityKind::Project,
                        project_id.as_uuid(),
                        "media_files_project_id_fkey",
                    )?;
                }
                Ok(())
            }
            Record::Project(_) => Ok(()),
        }
    }

    fn require(&self, kind: EntityKind, id: Uuid, constraint: &str) -> DomainResult<()> {
        if self.contains(kind, id) {
            Ok(())
        } else {
            Err(DomainError::persistence(format!(
                "foreign key violation ({constraint}): {kind} {id} does not exist"
            )))
        }
    }

    fn require_user(&self, id: Uuid, constraint: &str) -> DomainResult<()> {
        if self.users.contains(&id) {
            Ok(())
        } else {
            Err(DomainError::persistence(format!(
                "foreign key violation ({constraint}): user {id} does not exist"
            )))
        }
    }

    fn check_unique_slug(&self, kind: EntityKind, id: Uuid, slug: &str) -> DomainResult<()> {
        let taken = self.table(kind).any(|other| {
            other.id() != id
                && other
                    .field("slug")
                    .is_some_and(|value| value.eq_ignore_case(&FieldValue::from(slug)))
        });
        if taken {
            return Err(DomainError::persistence(format!(
                "unique violation: {kind} slug `{slug}` is already taken"
            )));
        }
        Ok(())
    }
}

fn check_article_tags(tables: &Tables, article: &Article) -> DomainResult<()> {
    article.tag_ids().iter().try_for_each(|tag_id| {
        tables.require(EntityKind::Tag, tag_id.as_uuid(), "article_tags_tag_id_fkey")
    })
}

fn matches(record: &Record, filter: Option<&Predicate<ColumnName>>) -> bool {
    filter.is_none_or(|predicate| predicate.matches(&|column: &ColumnName| record.field(column)))
}

/// Nulls sort last in both directions, matching `NULLS LAST` in SQL.
fn sort_values(a: Option<FieldValue>, b: Option<FieldValue>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = a.compare(&b).unwrap_or(Ordering::Equal);
            if ascending { ordering } else { ordering.reverse() }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn vanished(kind: EntityKind, id: Uuid) -> DomainError {
    DomainError::conflict(format!("{kind} {id} was deleted by another writer"))
}

fn stale(kind: EntityKind, id: Uuid) -> DomainError {
    DomainError::conflict(format!("{kind} {id} was modified by another writer"))
}

/// In-process [`Store`]. Cloning shares the underlying tables.
///
/// An open transaction holds the tables exclusively until it commits or is
/// dropped, so other callers wait rather than observe partial state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` a valid target for author and uploader references, the way
    /// a row in `users` does for the relational schema.
    pub async fn register_user(&self, id: Uuid) {
        self.tables.lock().await.users.insert(id);
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn provider(&self) -> StoreProvider {
        StoreProvider::Memory
    }

    async fn fetch(&self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        self.tables.lock().await.fetch(kind, query)
    }

    async fn count(
        &self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        Ok(self.tables.lock().await.count(kind, filter))
    }

    async fn apply(&self, mutations: &[Mutation]) -> DomainResult<u64> {
        self.tables.lock().await.apply(mutations)
    }

    async fn execute_raw(&self, _statement: &str, _params: &[FieldValue]) -> DomainResult<u64> {
        Err(unsupported_raw())
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }

    async fn begin(&self) -> DomainResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

fn unsupported_raw() -> DomainError {
    DomainError::persistence("raw statements are not supported by the in-memory store")
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn fetch(&mut self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        self.working.fetch(kind, query)
    }

    async fn count(
        &mut self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        Ok(self.working.count(kind, filter))
    }

    async fn apply(&mut self, mutations: &[Mutation]) -> DomainResult<u64> {
        self.working.apply(mutations)
    }

    async fn execute_raw(&mut self, _statement: &str, _params: &[FieldValue]) -> DomainResult<u64> {
        Err(unsupported_raw())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persistence::{Entity, SortOrder, Window};
    use crate::domain::project::{Project, ProjectDetails};
    use crate::domain::tag::{Tag, TagName, TagSlug};
    use chrono::Utc;

    fn tag(name: &str, slug: &str) -> Tag {
        Tag::new(
            TagName::new(name).unwrap(),
            TagSlug::new(slug).unwrap(),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    fn project(order: i32) -> Project {
        Project::new(
            ProjectDetails {
                title: format!("Project {order}"),
                description: "desc".into(),
                display_order: order,
                is_active: true,
                ..ProjectDetails::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn failed_batch_applies_nothing() {
        let store = InMemoryStore::new();
        let first = tag("Rust", "rust");
        let clash = tag("RUST", "rust");

        let err = store
            .apply(&[
                Mutation::Insert(first.clone().into_record()),
                Mutation::Insert(clash.into_record()),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        assert_eq!(store.count(EntityKind::Tag, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn writes_assign_fresh_tokens_and_reject_stale_ones() {
        let store = InMemoryStore::new();
        let project = project(1);
        store
            .apply(&[Mutation::Insert(project.clone().into_record())])
            .await
            .unwrap();

        let loaded = store.fetch(EntityKind::Project, &Query::default()).await.unwrap();
        let loaded = Project::from_record(loaded[0].clone()).unwrap();
        assert_ne!(loaded.version(), ConcurrencyToken::unsaved());

        let stale = loaded.clone().with_expected_version(ConcurrencyToken::fresh());
        let err = store
            .apply(&[Mutation::Update(stale.into_record())])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict(_)));

        store
            .apply(&[Mutation::Update(loaded.into_record())])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ordering_and_windows_follow_the_query() {
        let store = InMemoryStore::new();
        let batch: Vec<_> = [3, 1, 2]
            .into_iter()
            .map(|order| Mutation::Insert(project(order).into_record()))
            .collect();
        store.apply(&batch).await.unwrap();

        let query = Query {
            filter: None,
            order: Some(SortOrder {
                column: "display_order",
                ascending: false,
            }),
            window: Some(Window { offset: 1, limit: 5 }),
        };
        let rows = store.fetch(EntityKind::Project, &query).await.unwrap();
        let orders: Vec<_> = rows
            .into_iter()
            .map(|r| Project::from_record(r).unwrap().display_order)
            .collect();
        assert_eq!(orders, vec![2, 1]);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_its_writes() {
        let store = InMemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.apply(&[Mutation::Insert(tag("Go", "go").into_record())])
                .await
                .unwrap();
            assert_eq!(tx.count(EntityKind::Tag, None).await.unwrap(), 1);
        }
        assert_eq!(store.count(EntityKind::Tag, None).await.unwrap(), 0);

        let mut tx = store.begin().await.unwrap();
        tx.apply(&[Mutation::Insert(tag("Go", "go").into_record())])
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.count(EntityKind::Tag, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn raw_statements_are_rejected() {
        let store = InMemoryStore::new();
        assert!(store.execute_raw("DELETE FROM tags", &[]).await.is_err());
    }
}
