// tests/support/helpers.rs
use std::sync::Arc;

use folio_core::application::ports::{
    storage::MediaStorage, telemetry::Telemetry, time::Clock, util::SlugGenerator,
};
use folio_core::application::services::ApplicationServices;
use folio_core::domain::persistence::Store;
use folio_core::infrastructure::{
    store::InMemoryStore, time::ManualClock, util::DefaultSlugGenerator,
};
use folio_core::presentation::api::LocalContentApi;

use super::mocks::{MemoryStorage, RecordingTelemetry, fixed_now};

/// Everything a test needs to drive the services and inspect the fakes.
pub struct TestApp {
    pub services: Arc<ApplicationServices>,
    pub store: Arc<dyn Store>,
    pub clock: ManualClock,
    pub storage: Arc<MemoryStorage>,
    pub telemetry: Arc<RecordingTelemetry>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let clock = ManualClock::new(fixed_now());
        let storage = Arc::new(MemoryStorage::default());
        let telemetry = Arc::new(RecordingTelemetry::default());

        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let slugger: Arc<dyn SlugGenerator> = Arc::new(DefaultSlugGenerator);
        let storage_port: Arc<dyn MediaStorage> = Arc::clone(&storage) as Arc<dyn MediaStorage>;
        let telemetry_port: Arc<dyn Telemetry> = Arc::clone(&telemetry) as Arc<dyn Telemetry>;

        let services = Arc::new(ApplicationServices::new(
            Arc::clone(&store),
            storage_port,
            shared_clock,
            slugger,
            telemetry_port,
        ));

        Self {
            services,
            store,
            clock,
            storage,
            telemetry,
        }
    }

    pub fn api(&self) -> LocalContentApi {
        LocalContentApi::new(Arc::clone(&self.services))
    }
}
