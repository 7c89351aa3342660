//! Cron expression handling.
//!
//! The scheduler expects six fields with seconds first. Administrators may
//! also supply the classic five-field form, which fires at second 0.

use tokio_cron_scheduler::Job as CronJob;

use logvault_core::error::AppError;
use logvault_core::result::AppResult;

/// Convert a 5- or 6-field expression into the scheduler's 6-field form.
pub fn normalize(expr: &str) -> AppResult<String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 => Ok(fields.join(" ")),
        n => Err(AppError::validation(format!(
            "Cron expression '{expr}' has {n} fields, expected 5 or 6"
        ))),
    }
}

/// Normalize `expr` and check that the scheduler accepts it.
///
/// Nothing is registered; the throwaway job is dropped.
pub fn validate(expr: &str) -> AppResult<String> {
    let normalized = normalize(expr)?;
    CronJob::new_async(normalized.as_str(), |_uuid, _lock| Box::pin(async {}))
        .map_err(|e| AppError::validation(format!("Invalid cron expression '{expr}': {e}")))?;
    Ok(normalized)
}
