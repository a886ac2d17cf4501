use std::sync::Arc;

use crate::{
    application::{
        commands::report_failure,
        error::ApplicationError,
        ports::{storage::MediaStorage, telemetry::Telemetry, time::Clock},
        unit_of_work::UnitOfWork,
    },
    domain::{media::MediaFile, persistence::Store},
    telemetry_props,
};

pub struct MediaCommandService {
    pub(super) store: Arc<dyn Store>,
    pub(super) storage: Arc<dyn MediaStorage>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) telemetry: Arc<dyn Telemetry>,
}

impl MediaCommandService {
    pub fn new(
        store: Arc<dyn Store>,
        storage: Arc<dyn MediaStorage>,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        Self {
            store,
            storage,
            clock,
            telemetry,
        }
    }

    pub(super) fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    pub(super) fn record(&self, name: &'static str, file: &MediaFile) {
        tracing::info!(
            event = name,
            media_id = %file.id,
            category = %file.category,
            orphaned = file.is_orphaned(),
            "media event"
        );
        self.telemetry.record_event(
            name,
            telemetry_props! {
                "media_id" => file.id.to_string(),
                "category" => file.category.as_str(),
            },
        );
    }

    pub(super) fn fail(&self, operation: &'static str, err: ApplicationError) -> ApplicationError {
        report_failure(self.telemetry.as_ref(), operation, &err);
        err
    }
}
