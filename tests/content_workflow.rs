use std::sync::Arc;

use chrono::Duration;

mod support;

use folio_core::application::commands::{
    articles::{
        ArticleTransition, CreateArticleCommand, DeleteArticleCommand, SeoInput,
        UpdateArticleCommand,
    },
    comments::ModerateCommentCommand,
    media::{AttachMediaCommand, DeleteMediaCommand, UploadMediaCommand},
    tags::{DeleteTagCommand, UpdateTagCommand},
};
use folio_core::application::dto::Audience;
use folio_core::application::error::ApplicationError;
use folio_core::domain::article::ArticleStatus;
use folio_core::domain::comment::{CommentStatus, ModerationAction};
use folio_core::domain::errors::DomainError;
use folio_core::infrastructure::store::InMemoryStore;
use folio_core::presentation::api::ContentApi;
use support::*;
use uuid::Uuid;

#[tokio::test]
async fn colliding_tag_names_get_numbered_slugs() {
    let app = TestApp::new();
    let api = app.api();

    let first = api.create_tag(Audience::Staff, new_tag("C# .NET")).await.unwrap();
    let second = api.create_tag(Audience::Staff, new_tag("C#-NET")).await.unwrap();
    let third = api.create_tag(Audience::Staff, new_tag("c .net")).await.unwrap();

    assert_eq!(first.slug, "c-net");
    assert_eq!(second.slug, "c-net-1");
    assert_eq!(third.slug, "c-net-2");
    assert_eq!(
        app.telemetry.events(),
        vec!["TagCreated", "TagCreated", "TagCreated"]
    );
}

#[tokio::test]
async fn punctuation_heavy_names_share_a_base_slug() {
    let app = TestApp::new();
    let api = app.api();

    let first = api.create_tag(Audience::Staff, new_tag("C# .NET!!")).await.unwrap();
    let second = api.create_tag(Audience::Staff, new_tag("C# .NET")).await.unwrap();

    assert_eq!(first.slug, "c-net");
    assert_eq!(second.slug, "c-net-1");
}

#[tokio::test]
async fn long_tag_names_are_truncated_then_numbered() {
    let app = TestApp::new();
    let api = app.api();
    let name = format!("{} tail", "a".repeat(49));

    let first = api.create_tag(Audience::Staff, new_tag(&name)).await.unwrap();
    let second = api.create_tag(Audience::Staff, new_tag(&name)).await.unwrap();

    // the cut lands on the separator, which is trimmed
    assert_eq!(first.slug, "a".repeat(49));
    assert_eq!(second.slug, format!("{}-1", "a".repeat(48)));
    assert!(second.slug.len() <= 50);
}

#[tokio::test]
async fn renaming_a_tag_does_not_collide_with_itself() {
    let app = TestApp::new();
    let api = app.api();
    let tag = api.create_tag(Audience::Staff, new_tag("Rust")).await.unwrap();

    let renamed = api
        .update_tag(
            Audience::Staff,
            UpdateTagCommand {
                id: tag.id,
                name: "rust".into(),
                description: Some("Systems programming".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(renamed.slug, "rust");
    assert_eq!(renamed.description.as_deref(), Some("Systems programming"));
}

#[tokio::test]
async fn tag_names_without_slug_characters_are_rejected() {
    let app = TestApp::new();
    let err = app
        .api()
        .create_tag(Audience::Staff, new_tag("???"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn public_readers_only_see_published_articles() {
    let app = TestApp::new();
    let api = app.api();
    let article = api
        .create_article(Audience::Staff, draft("Hello World"))
        .await
        .unwrap();
    assert_eq!(article.slug, "hello-world");
    assert_eq!(article.status, ArticleStatus::Draft);
    assert_eq!(article.published_at, None);

    let hidden = api.get_article(Audience::Public, article.id).await.unwrap_err();
    assert!(hidden.is_not_found());
    assert!(api.get_article(Audience::Staff, article.id).await.is_ok());

    api.change_article_status(Audience::Staff, transition(article.id, ArticleTransition::Publish))
        .await
        .unwrap();
    let visible = api
        .get_article_by_slug(Audience::Public, "HELLO-WORLD")
        .await
        .unwrap();
    assert_eq!(visible.id, article.id);
}

#[tokio::test]
async fn publish_unpublish_and_archive() {
    let app = TestApp::new();
    let api = app.api();
    let article = api
        .create_article(Audience::Staff, draft("Lifecycle"))
        .await
        .unwrap();

    let published = api
        .change_article_status(Audience::Staff, transition(article.id, ArticleTransition::Publish))
        .await
        .unwrap();
    assert_eq!(published.status, ArticleStatus::Published);
    assert_eq!(published.published_at, Some(fixed_now()));

    app.clock.advance(Duration::hours(1));
    let republished = api
        .change_article_status(Audience::Staff, transition(article.id, ArticleTransition::Publish))
        .await
        .unwrap();
    assert_eq!(republished.published_at, Some(fixed_now() + Duration::hours(1)));

    let unpublished = api
        .change_article_status(
            Audience::Staff,
            transition(article.id, ArticleTransition::Unpublish),
        )
        .await
        .unwrap();
    assert_eq!(unpublished.status, ArticleStatus::Draft);
    assert_eq!(unpublished.published_at, None);

    let err = api
        .change_article_status(
            Audience::Staff,
            transition(article.id, ArticleTransition::Unpublish),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Validation(_))
    ));

    let archived = api
        .change_article_status(Audience::Staff, transition(article.id, ArticleTransition::Archive))
        .await
        .unwrap();
    assert_eq!(archived.status, ArticleStatus::Archived);
    assert!(app.telemetry.events().contains(&"ArticleArchived".to_string()));
}

#[tokio::test]
async fn writes_require_staff() {
    let app = TestApp::new();
    let err = app
        .api()
        .create_article(Audience::Public, draft("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Forbidden(_)));
}

#[tokio::test]
async fn pending_comments_stay_out_of_the_public_thread() {
    let app = TestApp::new();
    let api = app.api();
    let article = api
        .create_article(Audience::Staff, published("Comments", &[]))
        .await
        .unwrap();

    let comment = api
        .submit_comment(comment_on(article.id, "Great post"))
        .await
        .unwrap();
    assert_eq!(comment.status, CommentStatus::Pending);
    assert_eq!(comment.author_email, None);

    assert!(api.approved_comments(article.id).await.unwrap().is_empty());
    let queue = app
        .services
        .comment_queries
        .moderation_queue(Audience::Staff, 1, 10)
        .await
        .unwrap();
    assert_eq!(queue.total_items, 1);

    let approved = api
        .moderate_comment(
            Audience::Staff,
            ModerateCommentCommand {
                id: comment.id,
                action: ModerationAction::Approve,
                version: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.status, CommentStatus::Approved);
    assert_eq!(approved.approved_at, Some(fixed_now()));

    let thread = api.approved_comments(article.id).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].content, "Great post");

    let rejected = api
        .moderate_comment(
            Audience::Staff,
            ModerateCommentCommand {
                id: comment.id,
                action: ModerationAction::Reject,
                version: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.approved_at, None);
    assert!(api.approved_comments(article.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn comments_on_drafts_are_refused() {
    let app = TestApp::new();
    let api = app.api();
    let article = api.create_article(Audience::Staff, draft("Quiet")).await.unwrap();

    let err = api
        .submit_comment(comment_on(article.id, "first"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Validation(_)));

    let missing = api
        .approved_comments(article.id)
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn tag_counts_depend_on_the_audience() {
    let app = TestApp::new();
    let api = app.api();
    api.create_article(Audience::Staff, published("Live", &["Rust", "Web"]))
        .await
        .unwrap();
    let hidden = CreateArticleCommand::builder()
        .title("Hidden")
        .content("draft body")
        .tag("rust")
        .build()
        .unwrap();
    api.create_article(Audience::Staff, hidden).await.unwrap();

    let count_for = |tags: &[folio_core::application::dto::TagWithCountDto], slug: &str| {
        tags.iter()
            .find(|t| t.tag.slug == slug)
            .map(|t| t.article_count)
    };

    let public = api.list_tags(Audience::Public).await.unwrap();
    assert_eq!(public.len(), 2);
    assert_eq!(count_for(&public, "rust"), Some(1));
    assert_eq!(count_for(&public, "web"), Some(1));

    let staff = api.list_tags(Audience::Staff).await.unwrap();
    assert_eq!(count_for(&staff, "rust"), Some(2));
}

#[tokio::test]
async fn deleting_a_tag_detaches_it_from_articles() {
    let app = TestApp::new();
    let api = app.api();
    let article = api
        .create_article(Audience::Staff, published("Tagged", &["Rust", "Web"]))
        .await
        .unwrap();
    let rust = article.tags.iter().find(|t| t.slug == "rust").unwrap().id;

    api.delete_tag(Audience::Staff, DeleteTagCommand { id: rust })
        .await
        .unwrap();

    let reloaded = api.get_article(Audience::Public, article.id).await.unwrap();
    let slugs: Vec<_> = reloaded.tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, ["web"]);
}

#[tokio::test]
async fn deleting_an_article_removes_comments_and_orphans_media() {
    let app = TestApp::new();
    let api = app.api();
    let article = api
        .create_article(Audience::Staff, published("Doomed", &["Rust"]))
        .await
        .unwrap();
    api.submit_comment(comment_on(article.id, "bye")).await.unwrap();
    let file = app
        .services
        .media_commands
        .upload_media(
            Audience::Staff,
            UploadMediaCommand {
                original_name: "diagram.png".into(),
                content_type: "image/png".into(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
                article_id: Some(article.id),
                project_id: None,
                uploaded_by: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(file.article_id, Some(article.id));

    api.delete_article(
        Audience::Staff,
        DeleteArticleCommand {
            id: article.id,
            version: Some(article.version),
        },
    )
    .await
    .unwrap();

    let uow = app.services.unit_of_work();
    assert_eq!(uow.comments().count(None).await.unwrap(), 0);
    assert_eq!(uow.articles().count(None).await.unwrap(), 0);

    let orphans = app
        .services
        .media_queries
        .orphaned_media(Audience::Staff, 1, 10)
        .await
        .unwrap();
    assert_eq!(orphans.items.len(), 1);
    assert_eq!(orphans.items[0].id, file.id);
    assert_eq!(app.storage.len(), 1);

    let tags = api.list_tags(Audience::Staff).await.unwrap();
    assert_eq!(tags[0].article_count, 0);
}

#[tokio::test]
async fn failed_storage_leaves_no_metadata() {
    let app = TestApp::new();
    app.storage.fail_next_store();

    let result = app
        .services
        .media_commands
        .upload_media(
            Audience::Staff,
            UploadMediaCommand {
                original_name: "notes.pdf".into(),
                content_type: "application/pdf".into(),
                bytes: b"%PDF".to_vec(),
                article_id: None,
                project_id: None,
                uploaded_by: None,
            },
        )
        .await;

    assert!(result.is_err());
    let uow = app.services.unit_of_work();
    assert_eq!(uow.media().count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn projects_are_ordered_and_inactive_ones_hidden() {
    let app = TestApp::new();
    let api = app.api();
    api.create_project(Audience::Staff, project("Second", 2, true))
        .await
        .unwrap();
    let retired = api
        .create_project(Audience::Staff, project("Retired", 0, false))
        .await
        .unwrap();
    api.create_project(Audience::Staff, project("First", 1, true))
        .await
        .unwrap();

    let public: Vec<_> = api
        .list_projects(Audience::Public)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(public, ["First", "Second"]);

    let staff = api.list_projects(Audience::Staff).await.unwrap();
    assert_eq!(staff.len(), 3);
    assert_eq!(staff[0].title, "Retired");

    assert!(
        api.get_project(Audience::Public, retired.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn media_can_be_attached_and_deleted() {
    let app = TestApp::new();
    let media = &app.services.media_commands;
    let project = app
        .api()
        .create_project(Audience::Staff, project("Folio", 1, true))
        .await
        .unwrap();

    let file = media
        .upload_media(
            Audience::Staff,
            UploadMediaCommand {
                original_name: "screenshot.png".into(),
                content_type: "image/png".into(),
                bytes: vec![1, 2, 3],
                article_id: None,
                project_id: None,
                uploaded_by: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(app.storage.len(), 1);

    let attached = media
        .attach_media(
            Audience::Staff,
            AttachMediaCommand {
                id: file.id,
                article_id: None,
                project_id: Some(project.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(attached.project_id, Some(project.id));
    let orphans = app
        .services
        .media_queries
        .orphaned_media(Audience::Staff, 1, 10)
        .await
        .unwrap();
    assert_eq!(orphans.total_items, 0);

    media
        .delete_media(Audience::Staff, DeleteMediaCommand { id: file.id })
        .await
        .unwrap();
    assert_eq!(app.storage.len(), 0);
    assert!(app.telemetry.events().contains(&"MediaDeleted".to_string()));
}

#[tokio::test]
async fn archive_keeps_the_publish_date_and_publish_refreshes_it() {
    let app = TestApp::new();
    let api = app.api();

    let never_published = api
        .create_article(Audience::Staff, draft("Shelved draft"))
        .await
        .unwrap();
    let shelved = api
        .change_article_status(
            Audience::Staff,
            transition(never_published.id, ArticleTransition::Archive),
        )
        .await
        .unwrap();
    assert_eq!(shelved.status, ArticleStatus::Archived);
    assert_eq!(shelved.published_at, None);

    let article = api
        .create_article(Audience::Staff, published("Retired", &[]))
        .await
        .unwrap();
    assert_eq!(article.published_at, Some(fixed_now()));

    app.clock.advance(Duration::days(1));
    let archived = api
        .change_article_status(Audience::Staff, transition(article.id, ArticleTransition::Archive))
        .await
        .unwrap();
    assert_eq!(archived.status, ArticleStatus::Archived);
    assert_eq!(archived.published_at, Some(fixed_now()));
    assert!(api.get_article(Audience::Public, article.id).await.unwrap_err().is_not_found());

    app.clock.advance(Duration::days(1));
    let revived = api
        .change_article_status(Audience::Staff, transition(article.id, ArticleTransition::Publish))
        .await
        .unwrap();
    assert_eq!(revived.status, ArticleStatus::Published);
    assert_eq!(revived.published_at, Some(fixed_now() + Duration::days(2)));
}

#[tokio::test]
async fn stale_article_edit_is_rejected_without_side_effects() {
    let app = TestApp::new();
    let api = app.api();
    let original = api
        .create_article(Audience::Staff, draft("Original"))
        .await
        .unwrap();

    let edit = |title: &str, tags: Option<Vec<String>>| UpdateArticleCommand {
        id: original.id,
        version: original.version,
        title: title.into(),
        content: format!("Body of {title}"),
        summary: None,
        tags,
        seo: SeoInput::default(),
    };

    let mine = api
        .update_article(Audience::Staff, edit("Mine", None))
        .await
        .unwrap();
    assert_eq!(mine.slug, "mine");

    let err = api
        .update_article(
            Audience::Staff,
            edit("Theirs", Some(vec!["Fresh".into(), "Another".into()])),
        )
        .await
        .unwrap_err();
    assert!(err.is_concurrency_conflict());

    let current = api.get_article(Audience::Staff, original.id).await.unwrap();
    assert_eq!(current.title, "Mine");
    assert_eq!(current.slug, "mine");
    assert!(current.tags.is_empty());
    assert!(api.list_tags(Audience::Staff).await.unwrap().is_empty());
}

#[tokio::test]
async fn authors_must_be_known_identities() {
    let store = InMemoryStore::new();
    let app = TestApp::with_store(Arc::new(store.clone()));
    let api = app.api();
    let author = Uuid::new_v4();

    let command = || {
        CreateArticleCommand::builder()
            .title("Signed")
            .content("Body")
            .author(author)
            .build()
            .unwrap()
    };

    assert!(api.create_article(Audience::Staff, command()).await.is_err());
    let uow = app.services.unit_of_work();
    assert_eq!(uow.articles().count(None).await.unwrap(), 0);

    store.register_user(author).await;
    let article = api.create_article(Audience::Staff, command()).await.unwrap();
    assert_eq!(article.author_id, Some(author));
}
