//! Persistence snapshot shapes and batch validation for notifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidNotification;
use crate::notification::{Category, Notification};

/// Session-storage key holding the notification snapshot batch.
pub const NOTIFICATION_SNAPSHOT_KEY: &str = "ui.notifications.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Structural snapshot of a notification, the exact inverse of import.
pub struct NotificationSnapshot {
    /// Opaque notification id, preserved verbatim across the round trip.
    pub id: String,
    /// Title text, null when the notification is message-only.
    pub title: Option<String>,
    /// Message text, null when the notification is title-only.
    pub message: Option<String>,
    /// Canonical category label.
    pub category: String,
    /// Lifetime in milliseconds.
    pub duration_ms: u64,
    /// Creation time in unix milliseconds.
    pub created_at_unix_ms: u64,
    /// Expiry time in unix milliseconds.
    pub expires_at_unix_ms: u64,
}

/// Structurally validates one snapshot record.
///
/// Checks the persistence contract: string id, title/message each
/// string-or-null with at least one non-empty string present, a canonical
/// category label, and unsigned integer timing fields.
pub fn is_valid_record(record: &Value) -> bool {
    let Some(object) = record.as_object() else {
        return false;
    };
    if !object.get("id").is_some_and(Value::is_string) {
        return false;
    }

    let title = object.get("title").unwrap_or(&Value::Null);
    let message = object.get("message").unwrap_or(&Value::Null);
    let text_or_null = |value: &Value| value.is_string() || value.is_null();
    if !text_or_null(title) || !text_or_null(message) {
        return false;
    }
    let non_empty = |value: &Value| value.as_str().is_some_and(|text| !text.is_empty());
    if !non_empty(title) && !non_empty(message) {
        return false;
    }

    let Some(category) = object.get("category").and_then(Value::as_str) else {
        return false;
    };
    if !Category::is_canonical_label(category) {
        return false;
    }

    ["duration_ms", "created_at_unix_ms", "expires_at_unix_ms"]
        .iter()
        .all(|field| object.get(*field).is_some_and(Value::is_u64))
}

/// Encodes the live set as a JSON array of snapshot records.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
pub fn encode_snapshot_batch(notifications: &[Notification]) -> Result<String, String> {
    let records: Vec<NotificationSnapshot> =
        notifications.iter().map(Notification::export).collect();
    serde_json::to_string(&records).map_err(|e| e.to_string())
}

/// Decodes and validates a persisted batch, all-or-nothing.
///
/// # Errors
///
/// Returns [`InvalidNotification::UnreadableSnapshot`] when `raw` is not a
/// JSON array, or [`InvalidNotification::RejectedBatch`] with the invalid
/// count when any record fails validation. No partial batch is ever produced.
pub fn decode_snapshot_batch(raw: &str) -> Result<Vec<NotificationSnapshot>, InvalidNotification> {
    let records: Vec<Value> =
        serde_json::from_str(raw).map_err(|_| InvalidNotification::UnreadableSnapshot)?;

    let total = records.len();
    let invalid = records
        .iter()
        .filter(|record| !is_valid_record(record))
        .count();
    if invalid > 0 {
        return Err(InvalidNotification::RejectedBatch { invalid, total });
    }

    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|_| InvalidNotification::MalformedRecord)
        })
        .collect()
}
