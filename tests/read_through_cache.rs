use std::sync::Arc;

use chrono::Duration;

mod support;

use folio_core::application::commands::{
    articles::ArticleTransition, comments::ModerateCommentCommand, projects::UpdateProjectCommand,
};
use folio_core::application::dto::{ArticleDto, Audience, Page};
use folio_core::application::queries::articles::ListArticlesQuery;
use folio_core::config::CacheConfig;
use folio_core::domain::comment::ModerationAction;
use folio_core::presentation::api::{ContentApi, LocalContentApi};
use folio_core::presentation::cache::{CachedContentApi, ResponseCache};
use support::*;
use uuid::Uuid;

fn cached(app: &TestApp) -> CachedContentApi<LocalContentApi> {
    let cache = Arc::new(ResponseCache::new(Arc::new(app.clock.clone())));
    CachedContentApi::new(app.api(), cache, CacheConfig::default())
}

#[tokio::test]
async fn article_listing_is_served_from_cache_until_the_ttl_runs_out() {
    let app = TestApp::new();
    let api = cached(&app);

    assert!(
        api.cache()
            .get::<Page<ArticleDto>>("articles_page1_size10")
            .is_none()
    );

    app.api()
        .create_article(Audience::Staff, published("One", &[]))
        .await
        .unwrap();
    let first = api
        .list_articles(Audience::Public, ListArticlesQuery::default())
        .await
        .unwrap();
    assert_eq!(first.total_items, 1);
    assert!(
        api.cache()
            .get::<Page<ArticleDto>>("articles_page1_size10")
            .is_some()
    );

    // a write that bypasses the cache stays invisible until expiry
    app.api()
        .create_article(Audience::Staff, published("Two", &[]))
        .await
        .unwrap();
    app.clock.advance(Duration::minutes(4));
    let cached_page = api
        .list_articles(Audience::Public, ListArticlesQuery::default())
        .await
        .unwrap();
    assert_eq!(cached_page.total_items, 1);

    app.clock.advance(Duration::minutes(1));
    let fresh = api
        .list_articles(Audience::Public, ListArticlesQuery::default())
        .await
        .unwrap();
    assert_eq!(fresh.total_items, 2);
}

#[tokio::test]
async fn audiences_and_queries_have_separate_entries() {
    let app = TestApp::new();
    let api = cached(&app);
    app.api()
        .create_article(Audience::Staff, draft("Draft only"))
        .await
        .unwrap();

    let public = api
        .list_articles(Audience::Public, ListArticlesQuery::default())
        .await
        .unwrap();
    let staff = api
        .list_articles(Audience::Staff, ListArticlesQuery::default())
        .await
        .unwrap();
    let searched = api
        .list_articles(
            Audience::Staff,
            ListArticlesQuery {
                search: Some("nothing matches".into()),
                ..ListArticlesQuery::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(public.total_items, 0);
    assert_eq!(staff.total_items, 1);
    assert_eq!(searched.total_items, 0);
    assert_eq!(api.cache().len(), 3);
}

#[tokio::test]
async fn writes_through_the_cache_invalidate_affected_entries() {
    let app = TestApp::new();
    let api = cached(&app);

    let article = api
        .create_article(Audience::Staff, published("Cached", &["Rust"]))
        .await
        .unwrap();
    let detail = api.get_article(Audience::Public, article.id).await.unwrap();
    assert_eq!(detail.title, "Cached");
    let tags = api.list_tags(Audience::Public).await.unwrap();
    assert_eq!(tags[0].article_count, 1);

    api.change_article_status(
        Audience::Staff,
        transition(article.id, ArticleTransition::Unpublish),
    )
    .await
    .unwrap();

    assert!(
        api.get_article(Audience::Public, article.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
    let tags = api.list_tags(Audience::Public).await.unwrap();
    assert_eq!(tags[0].article_count, 0);
}

#[tokio::test]
async fn moderation_refreshes_the_comment_thread() {
    let app = TestApp::new();
    let api = cached(&app);
    let article = api
        .create_article(Audience::Staff, published("Thread", &[]))
        .await
        .unwrap();
    let comment = api
        .submit_comment(comment_on(article.id, "hello"))
        .await
        .unwrap();
    assert!(api.approved_comments(article.id).await.unwrap().is_empty());

    api.moderate_comment(
        Audience::Staff,
        ModerateCommentCommand {
            id: comment.id,
            action: ModerationAction::Approve,
            version: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(api.approved_comments(article.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn project_updates_drop_list_and_detail_entries() {
    let app = TestApp::new();
    let api = cached(&app);
    let created = api
        .create_project(Audience::Staff, project("Folio", 1, true))
        .await
        .unwrap();
    assert_eq!(api.list_projects(Audience::Public).await.unwrap().len(), 1);
    api.get_project(Audience::Public, created.id).await.unwrap();

    let mut details = project("Folio", 1, false).details;
    details.description = "retired".into();
    api.update_project(
        Audience::Staff,
        UpdateProjectCommand {
            id: created.id,
            version: created.version,
            details,
        },
    )
    .await
    .unwrap();

    assert!(api.list_projects(Audience::Public).await.unwrap().is_empty());
    assert!(
        api.get_project(Audience::Public, created.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn failures_are_not_cached() {
    let app = TestApp::new();
    let api = cached(&app);

    let missing = Uuid::new_v4();
    assert!(api.get_article(Audience::Staff, missing).await.is_err());
    assert!(api.cache().is_empty());
}
