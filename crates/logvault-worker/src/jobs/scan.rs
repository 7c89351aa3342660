//! Periodic scan of every service log directory.

use async_trait::async_trait;
use serde_json::Value;

use logvault_service::LogScanner;

use crate::executor::{JobExecutionError, JobHandler};
use crate::scheduler::JobContext;

/// Runs a full scan pass.
#[derive(Debug)]
pub struct LogScanJob {
    scanner: LogScanner,
}

impl LogScanJob {
    /// Create a scan job over `scanner`.
    pub fn new(scanner: LogScanner) -> Self {
        Self { scanner }
    }
}

#[async_trait]
impl JobHandler for LogScanJob {
    fn job_type(&self) -> &str {
        "log_scan"
    }

    async fn execute(&self, _ctx: &JobContext) -> Result<Value, JobExecutionError> {
        let summary = self.scanner.scan_all().await;
        serde_json::to_value(&summary).map_err(|e| JobExecutionError::Internal(e.into()))
    }
}
