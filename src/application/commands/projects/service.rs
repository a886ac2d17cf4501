use std::sync::Arc;

use crate::{
    application::{
        commands::report_failure,
        error::ApplicationError,
        ports::{telemetry::Telemetry, time::Clock},
        unit_of_work::UnitOfWork,
    },
    domain::{persistence::Store, project::ProjectId},
    telemetry_props,
};

pub struct ProjectCommandService {
    pub(super) store: Arc<dyn Store>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) telemetry: Arc<dyn Telemetry>,
}

impl ProjectCommandService {
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

    pub(super) fn record(&self, name: &'static str, id: ProjectId) {
        tracing::info!(event = name, project_id = %id, "project event");
        self.telemetry
            .record_event(name, telemetry_props! { "project_id" => id.to_string() });
    }

    pub(super) fn fail(&self, operation: &'static str, err: ApplicationError) -> ApplicationError {
        report_failure(self.telemetry.as_ref(), operation, &err);
        err
    }
}
