//! Deployment-level retention switches.
//!
//! The retention window and cron schedule are *not* configured here: they
//! live in the persisted retention config row and are changed at runtime.

use serde::{Deserialize, Serialize};

/// Switches read once when the retention manager is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionSettings {
    /// Compress expired files into `archived/` instead of deleting them.
    #[serde(default = "default_true")]
    pub archive_enabled: bool,
    /// Keep the `log_files` row (marked archived) after cleanup.
    #[serde(default = "default_true")]
    pub keep_archived_records: bool,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            archive_enabled: true,
            keep_archived_records: true,
        }
    }
}

fn default_true() -> bool {
    true
}
