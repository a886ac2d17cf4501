//! sqlx/Postgres [`Store`]. Schema lives in `migrations/`; article tags are
//! kept in `article_tags` with a `position` column preserving their order.

mod error;
mod rows;
mod sql;

pub use error::map_sqlx;

use crate::domain::article::Article;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{ConcurrencyToken, TagId};
use crate::domain::persistence::{
    ColumnName, EntityKind, FieldValue, Mutation, Predicate, Query, Record, Store, StoreProvider,
    StoreTransaction,
};
use async_trait::async_trait;
use rows::TagLinks;
use sqlx::{PgConnection, PgPool, Postgres, Transaction, postgres::PgArguments, query::Query as SqlxQuery};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn fetch_on(
    conn: &mut PgConnection,
    kind: EntityKind,
    query: &Query,
) -> DomainResult<Vec<Record>> {
    let mut builder = sql::select(kind, rows::select_columns(kind), query)?;
    let fetched = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(map_sqlx)?;

    let links = if kind == EntityKind::Article && !fetched.is_empty() {
        let ids = fetched
            .iter()
            .map(|row| sqlx::Row::try_get::<Uuid, _>(row, "id").map_err(map_sqlx))
            .collect::<DomainResult<Vec<_>>>()?;
        tag_links(conn, ids).await?
    } else {
        TagLinks::new()
    };

    fetched
        .iter()
        .map(|row| rows::decode(kind, row, &links))
        .collect()
}

async fn tag_links(conn: &mut PgConnection, article_ids: Vec<Uuid>) -> DomainResult<TagLinks> {
    let pairs: Vec<(Uuid, Uuid)> = sqlx::query_as(
        "SELECT article_id, tag_id FROM article_tags
         WHERE article_id = ANY($1)
         ORDER BY article_id, position",
    )
    .bind(article_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_sqlx)?;

    let mut links = TagLinks::new();
    for (article_id, tag_id) in pairs {
        links.entry(article_id).or_default().push(TagId::from(tag_id));
    }
    Ok(links)
}

async fn count_on(
    conn: &mut PgConnection,
    kind: EntityKind,
    filter: Option<&Predicate<ColumnName>>,
) -> DomainResult<u64> {
    let mut builder = sql::count(kind, filter)?;
    let total: i64 = builder
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await
        .map_err(map_sqlx)?;
    Ok(u64::try_from(total).unwrap_or_default())
}

async fn apply_on(conn: &mut PgConnection, mutations: &[Mutation]) -> DomainResult<u64> {
    let mut affected = 0;
    for mutation in mutations {
        affected += apply_one(conn, mutation).await?;
    }
    Ok(affected)
}

fn lost_write(kind: EntityKind, id: Uuid) -> DomainError {
    DomainError::conflict(format!(
        "{kind} {id} was modified or deleted by another writer"
    ))
}

async fn apply_one(conn: &mut PgConnection, mutation: &Mutation) -> DomainResult<u64> {
    match mutation {
        Mutation::Insert(record) => {
            let kind = record.kind();
            let mut fields = record.stored_fields();
            if kind.is_versioned() {
                fields.push(("version", ConcurrencyToken::fresh().as_uuid().into()));
            }
            let mut builder = sql::insert(kind, &fields);
            let result = builder
                .build()
                .execute(&mut *conn)
                .await
                .map_err(map_sqlx)?;
            if let Record::Article(article) = record {
                write_tags(conn, article, false).await?;
            }
            Ok(result.rows_affected())
        }
        Mutation::Update(record) => {
            let kind = record.kind();
            let id = record.id();
            let mut fields = record.stored_fields();
            let expected = if kind.is_versioned() {
                fields.push(("version", ConcurrencyToken::fresh().as_uuid().into()));
                record.concurrency_token().map(|token| token.as_uuid())
            } else {
                None
            };
            let mut builder = sql::update(kind, id, &fields, expected);
            let result = builder
                .build()
                .execute(&mut *conn)
                .await
                .map_err(map_sqlx)?;
            if result.rows_affected() == 0 {
                return Err(lost_write(kind, id));
            }
            if let Record::Article(article) = record {
                write_tags(conn, article, true).await?;
            }
            Ok(result.rows_affected())
        }
        Mutation::Delete { kind, id, expected } => {
            let mut builder = sql::delete(*kind, *id, expected.as_ref().map(ConcurrencyToken::as_uuid));
            let result = builder
                .build()
                .execute(&mut *conn)
                .await
                .map_err(map_sqlx)?;
            if result.rows_affected() == 0 {
                return Err(lost_write(*kind, *id));
            }
            Ok(result.rows_affected())
        }
    }
}

async fn write_tags(conn: &mut PgConnection, article: &Article, replace: bool) -> DomainResult<()> {
    let article_id = article.id.as_uuid();
    if replace {
        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx)?;
    }
    if article.tag_ids().is_empty() {
        return Ok(());
    }

    let tag_ids: Vec<Uuid> = article.tag_ids().iter().map(TagId::as_uuid).collect();
    sqlx::query(
        "INSERT INTO article_tags (article_id, tag_id, position)
         SELECT $1, tag_id, (position - 1)::INTEGER
         FROM UNNEST($2::UUID[]) WITH ORDINALITY AS t(tag_id, position)",
    )
    .bind(article_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

fn bind_value<'q>(
    query: SqlxQuery<'q, Postgres, PgArguments>,
    value: &FieldValue,
) -> SqlxQuery<'q, Postgres, PgArguments> {
    match value {
        FieldValue::Null => query.bind(None::<String>),
        FieldValue::Bool(v) => query.bind(*v),
        FieldValue::Int(v) => query.bind(*v),
        FieldValue::Text(v) => query.bind(v.clone()),
        FieldValue::Uuid(v) => query.bind(*v),
        FieldValue::Timestamp(v) => query.bind(*v),
        FieldValue::Date(v) => query.bind(*v),
        FieldValue::UuidList(v) => query.bind(v.clone()),
    }
}

async fn execute_raw_on(
    conn: &mut PgConnection,
    statement: &str,
    params: &[FieldValue],
) -> DomainResult<u64> {
    let query = params
        .iter()
        .fold(sqlx::query(statement), |query, value| bind_value(query, value));
    let result = query.execute(&mut *conn).await.map_err(map_sqlx)?;
    Ok(result.rows_affected())
}

#[async_trait]
impl Store for PgStore {
    fn provider(&self) -> StoreProvider {
        StoreProvider::Postgres
    }

    async fn fetch(&self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        fetch_on(&mut conn, kind, query).await
    }

    async fn count(
        &self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        count_on(&mut conn, kind, filter).await
    }

    async fn apply(&self, mutations: &[Mutation]) -> DomainResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let affected = apply_on(&mut tx, mutations).await?;
        tx.commit().await.map_err(map_sqlx)?;
        Ok(affected)
    }

    async fn execute_raw(&self, statement: &str, params: &[FieldValue]) -> DomainResult<u64> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        execute_raw_on(&mut conn, statement, params).await
    }

    async fn ping(&self) -> DomainResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn begin(&self) -> DomainResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx)?;
        Ok(Box::new(PgTransaction { tx }))
    }
}

/// Open database transaction. Each `apply` runs under a savepoint so a
/// rejected batch leaves earlier work in the transaction intact.
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgTransaction {
    async fn savepoint(&mut self, statement: &'static str) -> DomainResult<()> {
        sqlx::query(statement)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn fetch(&mut self, kind: EntityKind, query: &Query) -> DomainResult<Vec<Record>> {
        fetch_on(&mut self.tx, kind, query).await
    }

    async fn count(
        &mut self,
        kind: EntityKind,
        filter: Option<&Predicate<ColumnName>>,
    ) -> DomainResult<u64> {
        count_on(&mut self.tx, kind, filter).await
    }

    async fn apply(&mut self, mutations: &[Mutation]) -> DomainResult<u64> {
        self.savepoint("SAVEPOINT unit_of_work_batch").await?;
        match apply_on(&mut self.tx, mutations).await {
            Ok(affected) => {
                self.savepoint("RELEASE SAVEPOINT unit_of_work_batch").await?;
                Ok(affected)
            }
            Err(err) => {
                if let Err(rollback_err) =
                    self.savepoint("ROLLBACK TO SAVEPOINT unit_of_work_batch").await
                {
                    tracing::warn!(error = %rollback_err, "rolling back to savepoint failed");
                }
                Err(err)
            }
        }
    }

    async fn execute_raw(&mut self, statement: &str, params: &[FieldValue]) -> DomainResult<u64> {
        execute_raw_on(&mut self.tx, statement, params).await
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        self.tx.commit().await.map_err(map_sqlx)
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        self.tx.rollback().await.map_err(map_sqlx)
    }
}
