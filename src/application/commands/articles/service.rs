// src/application/commands/articles/service.rs
use std::sync::Arc;

use crate::{
    application::{
        commands::report_failure,
        error::ApplicationError,
        ports::{telemetry::Telemetry, time::Clock},
        unit_of_work::UnitOfWork,
    },
    domain::{article::ArticleEvent, persistence::Store, slug::SlugService},
    telemetry_props,
};

pub struct ArticleCommandService {
    pub(super) store: Arc<dyn Store>,
    pub(super) slug_service: Arc<SlugService>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) telemetry: Arc<dyn Telemetry>,
}

impl ArticleCommandService {
    pub fn new(
        store: Arc<dyn Store>,
        slug_service: Arc<SlugService>,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        Self {
            store,
            slug_service,
            clock,
            telemetry,
        }
    }

    pub(super) fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }
}

impl ArticleCommandService {
    pub(super) fn record(&self, events: &[ArticleEvent]) {
        for event in events {
            tracing::info!(event = event.name(), article_id = %event.article_id(), "article event");
            let mut props = telemetry_props! { "article_id" => event.article_id().to_string() };
            if let ArticleEvent::Published { republished, .. } = event {
                props.insert("republished".into(), (*republished).into());
            }
            self.telemetry.record_event(event.name(), props);
        }
    }

    /// Undo whatever the failed attempt left open, then report the failure.
    pub(super) async fn abandon(
        &self,
        uow: &UnitOfWork,
        operation: &'static str,
        err: ApplicationError,
    ) -> ApplicationError {
        if let Err(rollback_err) = uow.rollback_transaction().await {
            tracing::warn!(operation, error = %rollback_err, "rollback failed");
        }
        report_failure(self.telemetry.as_ref(), operation, &err);
        err
    }
}
