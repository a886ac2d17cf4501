use std::sync::Arc;

use crate::{
    application::{
        commands::report_failure,
        error::ApplicationError,
        ports::{telemetry::Telemetry, time::Clock},
        unit_of_work::UnitOfWork,
    },
    domain::{comment::Comment, persistence::Store},
    telemetry_props,
};

pub struct CommentCommandService {
    pub(super) store: Arc<dyn Store>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) telemetry: Arc<dyn Telemetry>,
}

impl CommentCommandService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, telemetry: Arc<dyn Telemetry>) -> Self {
        Self {
            store,
            clock,
            telemetry,
        }
    }

    pub(super) fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    pub(super) fn record(&self, name: &'static str, comment: &Comment) {
        tracing::info!(
            event = name,
            comment_id = %comment.id,
            article_id = %comment.article_id,
            status = %comment.status(),
            "comment event"
        );
        self.telemetry.record_event(
            name,
            telemetry_props! {
                "comment_id" => comment.id.to_string(),
                "article_id" => comment.article_id.to_string(),
            },
        );
    }

    pub(super) fn fail(&self, operation: &'static str, err: ApplicationError) -> ApplicationError {
        report_failure(self.telemetry.as_ref(), operation, &err);
        err
    }
}
