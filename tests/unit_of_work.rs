use std::sync::Arc;

mod support;

use folio_core::application::unit_of_work::UnitOfWork;
use folio_core::domain::errors::DomainError;
use folio_core::domain::persistence::{FieldValue, Store};
use folio_core::domain::project::{Project, ProjectDetails};
use folio_core::domain::tag::{Tag, TagName, TagSlug};
use folio_core::infrastructure::store::InMemoryStore;
use support::fixed_now;

fn memory_store() -> Arc<dyn Store> {
    Arc::new(InMemoryStore::new())
}

fn tag(name: &str, slug: &str) -> Tag {
    Tag::new(
        TagName::new(name).unwrap(),
        TagSlug::new(slug).unwrap(),
        None,
        fixed_now(),
    )
    .unwrap()
}

fn details(title: &str) -> ProjectDetails {
    ProjectDetails {
        title: title.into(),
        description: "portfolio entry".into(),
        tech_stack: "Rust".into(),
        display_order: 1,
        is_active: true,
        ..ProjectDetails::default()
    }
}

async fn seeded_project(store: &Arc<dyn Store>) -> Project {
    let uow = UnitOfWork::new(Arc::clone(store));
    let project = uow
        .projects()
        .add(Project::new(details("Original"), fixed_now()).unwrap())
        .await
        .unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 1);
    project
}

#[tokio::test]
async fn stale_token_rejects_the_whole_batch() {
    let store = memory_store();
    let id = seeded_project(&store).await.id;

    let first = UnitOfWork::new(Arc::clone(&store));
    let second = UnitOfWork::new(Arc::clone(&store));
    let mut mine = first.projects().get_by_id(id).await.unwrap();
    let mut theirs = second.projects().get_by_id(id).await.unwrap();

    mine.apply(details("Mine"), fixed_now()).unwrap();
    first.projects().update(mine).await.unwrap();
    first.save_changes().await.unwrap();

    theirs.apply(details("Theirs"), fixed_now()).unwrap();
    second.projects().update(theirs).await.unwrap();
    second.tags().add(tag("Rust", "rust")).await.unwrap();
    let err = second.save_changes().await.unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyConflict(_)));
    assert!(!second.has_changes().await);

    let check = UnitOfWork::new(Arc::clone(&store));
    assert_eq!(check.projects().get_by_id(id).await.unwrap().title, "Mine");
    assert_eq!(check.tags().count(None).await.unwrap(), 0);

    // reload and reapply
    let mut reloaded = second.projects().get_by_id(id).await.unwrap();
    reloaded.apply(details("Theirs"), fixed_now()).unwrap();
    second.projects().update(reloaded).await.unwrap();
    second.save_changes().await.unwrap();
    assert_eq!(check.projects().get_by_id(id).await.unwrap().title, "Theirs");
}

#[tokio::test]
async fn each_save_issues_a_new_token() {
    let store = memory_store();
    let project = seeded_project(&store).await;
    let uow = UnitOfWork::new(Arc::clone(&store));

    let loaded = uow.projects().get_by_id(project.id).await.unwrap();
    let before = loaded.version();
    uow.projects().update(loaded).await.unwrap();
    uow.save_changes().await.unwrap();

    let after = uow.projects().get_by_id(project.id).await.unwrap().version();
    assert_ne!(before, after);
}

#[tokio::test]
async fn deleting_a_vanished_row_is_a_conflict() {
    let store = memory_store();
    let project = seeded_project(&store).await;

    let first = UnitOfWork::new(Arc::clone(&store));
    let second = UnitOfWork::new(Arc::clone(&store));
    let copy = second.projects().get_by_id(project.id).await.unwrap();

    first.projects().delete(project.id).await.unwrap();
    first.save_changes().await.unwrap();

    second.projects().delete_entity(&copy).await;
    assert!(matches!(
        second.save_changes().await,
        Err(DomainError::ConcurrencyConflict(_))
    ));
}

#[tokio::test]
async fn staged_changes_are_private_until_saved() {
    let store = memory_store();
    let uow = UnitOfWork::new(Arc::clone(&store));
    let other = UnitOfWork::new(Arc::clone(&store));

    let rust = uow.tags().add(tag("Rust", "rust")).await.unwrap();
    assert!(uow.has_changes().await);
    assert!(uow.tags().find_by_id(rust.id).await.unwrap().is_some());
    assert!(other.tags().find_by_id(rust.id).await.unwrap().is_none());

    assert_eq!(uow.save_changes().await.unwrap(), 1);
    assert!(other.tags().find_by_id(rust.id).await.unwrap().is_some());
    assert_eq!(uow.save_changes().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_slugs_are_refused_by_the_store() {
    let store = memory_store();
    let uow = UnitOfWork::new(Arc::clone(&store));
    uow.tags().add(tag("Rust", "rust")).await.unwrap();
    uow.save_changes().await.unwrap();

    uow.tags().add(tag("RUST", "rust")).await.unwrap();
    assert!(matches!(
        uow.save_changes().await,
        Err(DomainError::Persistence(_))
    ));
}

#[tokio::test]
async fn rolled_back_transaction_leaves_nothing() {
    let store = memory_store();
    let uow = UnitOfWork::new(Arc::clone(&store));

    uow.begin_transaction().await.unwrap();
    assert!(uow.in_transaction().await);
    let rust = uow.tags().add(tag("Rust", "rust")).await.unwrap();
    uow.save_changes().await.unwrap();
    // visible inside the transaction
    assert_eq!(uow.tags().count(None).await.unwrap(), 1);
    uow.rollback_transaction().await.unwrap();

    assert!(!uow.in_transaction().await);
    assert!(uow.tags().find_by_id(rust.id).await.unwrap().is_none());
}

#[tokio::test]
async fn committed_transaction_includes_unsaved_changes() {
    let store = memory_store();
    let uow = UnitOfWork::new(Arc::clone(&store));

    uow.begin_transaction().await.unwrap();
    uow.tags().add(tag("Rust", "rust")).await.unwrap();
    uow.save_changes().await.unwrap();
    uow.tags().add(tag("Web", "web")).await.unwrap();
    uow.commit_transaction().await.unwrap();

    let check = UnitOfWork::new(store);
    assert_eq!(check.tags().count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn failed_commit_rolls_back_earlier_flushes() {
    let store = memory_store();
    let uow = UnitOfWork::new(Arc::clone(&store));

    uow.begin_transaction().await.unwrap();
    uow.tags().add(tag("Rust", "rust")).await.unwrap();
    uow.save_changes().await.unwrap();
    uow.tags().add(tag("Rust again", "rust")).await.unwrap();
    assert!(uow.commit_transaction().await.is_err());

    assert!(!uow.in_transaction().await);
    let check = UnitOfWork::new(store);
    assert_eq!(check.tags().count(None).await.unwrap(), 0);
}

#[tokio::test]
#[should_panic(expected = "already open")]
async fn nested_transactions_are_a_programming_error() {
    let uow = UnitOfWork::new(memory_store());
    uow.begin_transaction().await.unwrap();
    let _ = uow.begin_transaction().await;
}

#[tokio::test]
async fn raw_statements_must_bind_every_placeholder() {
    let uow = UnitOfWork::new(memory_store());

    let err = uow
        .execute_raw("DELETE FROM tags WHERE slug = $1", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // well-formed, but the in-memory store has no SQL engine
    let err = uow
        .execute_raw(
            "DELETE FROM tags WHERE slug = $1",
            &[FieldValue::from("rust")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Persistence(_)));
}

#[tokio::test]
async fn memory_store_answers_the_liveness_probe() {
    let uow = UnitOfWork::new(memory_store());
    assert!(uow.can_connect().await);
}
