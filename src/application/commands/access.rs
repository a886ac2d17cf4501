// src/application/commands/access.rs
use crate::application::{
    dto::Audience,
    error::{ApplicationError, ApplicationResult},
    ports::telemetry::Telemetry,
};
use crate::telemetry_props;

pub(crate) fn ensure_staff(audience: Audience, action: &str) -> ApplicationResult<()> {
    if audience.is_staff() {
        Ok(())
    } else {
        Err(ApplicationError::forbidden(format!(
            "staff access required to {action}"
        )))
    }
}

/// Log and record a failed write before handing it back to the caller.
/// Conflicts are never retried here; the caller reloads and reapplies.
pub(crate) fn report_failure(
    telemetry: &dyn Telemetry,
    operation: &'static str,
    err: &ApplicationError,
) {
    if err.is_concurrency_conflict() {
        tracing::warn!(operation, error = %err, "write rejected by concurrency check");
    } else {
        tracing::error!(operation, error = %err, "write failed");
    }
    telemetry.record_exception(err, telemetry_props! { "operation" => operation });
}
