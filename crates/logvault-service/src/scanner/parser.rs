//! Line parser: turns one raw log line into a [`NewLogEntry`].
//!
//! Parsing is attempted in order: JSON object → timestamped plain text →
//! catch-all. The catch-all guarantees every non-blank line yields exactly
//! one entry with a non-empty message.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::{Map, Value};

use logvault_entity::log_entry::{LogLevel, NewLogEntry};

/// `2024-01-01T10:00:00.123Z [ERROR] message` and close variants.
static PLAIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?(?P<ts>\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)\]?\s*(?:\[(?P<level>[A-Za-z]+)\])?\s*(?P<msg>.*)$",
    )
    .expect("plain log line pattern is valid")
});

/// Keys lifted out of a JSON line; everything else becomes metadata.
const RESERVED_KEYS: [&str; 9] = [
    "timestamp",
    "time",
    "@timestamp",
    "level",
    "severity",
    "message",
    "msg",
    "stack",
    "stackTrace",
];

/// Level words recognized at the start of an unbracketed message.
const BARE_LEVELS: [&str; 7] = ["error", "err", "warn", "warning", "info", "debug", "verbose"];

/// Stateless parser for heterogeneous log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser;

impl LineParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse `line` (1-based `line_number`). `now` stands in for a missing timestamp.
    pub fn parse(&self, line: &str, line_number: i64, now: DateTime<Utc>) -> NewLogEntry {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(entry) = parse_json(line, line_number, now) {
            return entry;
        }
        if let Some(entry) = parse_plain(line, line_number, now) {
            return entry;
        }

        NewLogEntry {
            timestamp: now,
            level: LogLevel::Info,
            message: line.to_string(),
            metadata: None,
            stack_trace: None,
            line_number,
        }
    }
}

fn parse_json(line: &str, line_number: i64, now: DateTime<Utc>) -> Option<NewLogEntry> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let Ok(Value::Object(mut record)) = serde_json::from_str::<Value>(trimmed) else {
        return None;
    };

    let timestamp = ["timestamp", "time", "@timestamp"]
        .iter()
        .find_map(|key| record.get(*key).and_then(json_timestamp))
        .unwrap_or(now);

    let level = ["level", "severity"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .map(LogLevel::normalize)
        .unwrap_or_default();

    let message = ["message", "msg"]
        .iter()
        .find_map(|key| record.get(*key))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| trimmed.to_string());

    let mut stack_trace = ["stack", "stackTrace"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    let metadata = match record.remove("metadata").or_else(|| record.remove("meta")) {
        Some(Value::Object(nested)) => {
            if stack_trace.is_none() {
                stack_trace = nested
                    .get("stack")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            Some(Value::Object(nested))
        }
        Some(Value::Null) | None => remaining_fields(record),
        Some(other) => Some(other),
    };

    Some(NewLogEntry {
        timestamp,
        level,
        message,
        metadata,
        stack_trace,
        line_number,
    })
}

fn remaining_fields(mut record: Map<String, Value>) -> Option<Value> {
    for key in RESERVED_KEYS {
        record.remove(key);
    }
    if record.is_empty() {
        None
    } else {
        Some(Value::Object(record))
    }
}

fn json_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_plain(line: &str, line_number: i64, now: DateTime<Utc>) -> Option<NewLogEntry> {
    let caps = PLAIN_LINE.captures(line)?;

    let timestamp = parse_timestamp(&caps["ts"]).unwrap_or(now);
    let mut message = caps["msg"].trim();

    let level = match caps.name("level") {
        Some(token) => LogLevel::normalize(token.as_str()),
        None => match split_bare_level(message) {
            Some((level, rest)) => {
                message = rest;
                level
            }
            None => LogLevel::Info,
        },
    };

    let message = if message.is_empty() {
        line.trim().to_string()
    } else {
        message.to_string()
    };

    Some(NewLogEntry {
        timestamp,
        level,
        message,
        metadata: None,
        stack_trace: None,
        line_number,
    })
}

/// `ERROR: something` or `warn something` → (level, rest).
fn split_bare_level(message: &str) -> Option<(LogLevel, &str)> {
    let (word, rest) = message.split_once(char::is_whitespace).unwrap_or((message, ""));
    let word = word.trim_end_matches(':');
    BARE_LEVELS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(word))
        .then(|| (LogLevel::normalize(word), rest.trim_start()))
}

/// Parse ISO-8601-like timestamps; naive values are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = raw.trim().replacen(' ', "T", 1).replace(',', ".");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
