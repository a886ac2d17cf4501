// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{
        commands::{
            articles::ArticleCommandService, comments::CommentCommandService,
            media::MediaCommandService, projects::ProjectCommandService, tags::TagCommandService,
        },
        ports::{
            storage::MediaStorage, telemetry::Telemetry, time::Clock, util::SlugGenerator,
        },
        queries::{
            articles::ArticleQueryService, comments::CommentQueryService,
            media::MediaQueryService, projects::ProjectQueryService, tags::TagQueryService,
        },
        unit_of_work::UnitOfWork,
    },
    domain::{persistence::Store, slug::SlugService},
};

/// Every command and query service, wired against one store.
pub struct ApplicationServices {
    pub article_commands: Arc<ArticleCommandService>,
    pub article_queries: Arc<ArticleQueryService>,
    pub comment_commands: Arc<CommentCommandService>,
    pub comment_queries: Arc<CommentQueryService>,
    pub tag_commands: Arc<TagCommandService>,
    pub tag_queries: Arc<TagQueryService>,
    pub project_commands: Arc<ProjectCommandService>,
    pub project_queries: Arc<ProjectQueryService>,
    pub media_commands: Arc<MediaCommandService>,
    pub media_queries: Arc<MediaQueryService>,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ApplicationServices {
    pub fn new(
        store: Arc<dyn Store>,
        storage: Arc<dyn MediaStorage>,
        clock: Arc<dyn Clock>,
        slugger: Arc<dyn SlugGenerator>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        let slug_service = Arc::new(SlugService::new(slugger));

        let article_commands = Arc::new(ArticleCommandService::new(
            Arc::clone(&store),
            Arc::clone(&slug_service),
            Arc::clone(&clock),
            Arc::clone(&telemetry),
        ));
        let tag_commands = Arc::new(TagCommandService::new(
            Arc::clone(&store),
            Arc::clone(&slug_service),
            Arc::clone(&clock),
            Arc::clone(&telemetry),
        ));
        let comment_commands = Arc::new(CommentCommandService::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&telemetry),
        ));
        let project_commands = Arc::new(ProjectCommandService::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&telemetry),
        ));
        let media_commands = Arc::new(MediaCommandService::new(
            Arc::clone(&store),
            storage,
            Arc::clone(&clock),
            telemetry,
        ));

        Self {
            article_commands,
            article_queries: Arc::new(ArticleQueryService::new(Arc::clone(&store))),
            comment_commands,
            comment_queries: Arc::new(CommentQueryService::new(Arc::clone(&store))),
            tag_commands,
            tag_queries: Arc::new(TagQueryService::new(Arc::clone(&store))),
            project_commands,
            project_queries: Arc::new(ProjectQueryService::new(Arc::clone(&store))),
            media_commands,
            media_queries: Arc::new(MediaQueryService::new(Arc::clone(&store))),
            store,
            clock,
        }
    }

    /// A fresh unit of work for callers that need the gateway directly.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}
