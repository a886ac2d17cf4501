use std::sync::Arc;

use crate::{
    application::{
        commands::report_failure,
        error::ApplicationError,
        ports::{telemetry::Telemetry, time::Clock},
        unit_of_work::UnitOfWork,
    },
    domain::{persistence::Store, slug::SlugService, tag::TagId},
    telemetry_props,
};

pub struct TagCommandService {
    pub(super) store: Arc<dyn Store>,
    pub(super) slug_service: Arc<SlugService>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) telemetry: Arc<dyn Telemetry>,
}

impl TagCommandService {
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

    pub(super) fn record(&self, name: &'static str, id: TagId, slug: &str) {
        tracing::info!(event = name, tag_id = %id, slug, "tag event");
        self.telemetry.record_event(
            name,
            telemetry_props! { "tag_id" => id.to_string(), "slug" => slug },
        );
    }

    pub(super) fn fail(&self, operation: &'static str, err: ApplicationError) -> ApplicationError {
        report_failure(self.telemetry.as_ref(), operation, &err);
        err
    }
}
