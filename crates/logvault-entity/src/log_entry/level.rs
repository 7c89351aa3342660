//! Log severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use logvault_core::error::AppError;

/// Severity of a parsed log entry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Failures.
    Error,
    /// Recoverable problems.
    Warn,
    /// Normal operation (also the fallback for unknown tokens).
    #[default]
    Info,
    /// Diagnostic detail.
    Debug,
}

impl LogLevel {
    /// All levels, most severe first.
    pub const ALL: [LogLevel; 4] = [Self::Error, Self::Warn, Self::Info, Self::Debug];

    /// Map a producer-specific level token onto the four stored levels.
    ///
    /// `err` → error, `warning` → warn, `verbose` → debug; anything
    /// unrecognized becomes info. Matching ignores case and surrounding space.
    pub fn normalize(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "error" | "err" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "verbose" => Self::Debug,
            _ => Self::Info,
        }
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    /// Strict parse used for query filters; only canonical names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(AppError::validation(format!("Unknown log level '{other}'"))),
        }
    }
}
