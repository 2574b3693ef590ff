//! Core notification model: categories, actions, and the notification record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidNotification;
use crate::snapshot::NotificationSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Canonical notification category.
pub enum Category {
    /// Operation completed.
    Success,
    /// Something failed.
    Error,
    /// Noteworthy but not fatal.
    Warning,
    /// Neutral informational message.
    #[default]
    Info,
}

impl Category {
    /// Normalizes a loose input spelling into a canonical category.
    ///
    /// Unrecognized input defaults to [`Category::Info`].
    pub fn parse_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "success" | "ok" => Category::Success,
            "error" | "err" | "fail" | "notok" => Category::Error,
            "warning" | "warn" => Category::Warning,
            _ => Category::Info,
        }
    }

    /// Returns the canonical wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Info => "info",
        }
    }

    pub(crate) fn is_canonical_label(label: &str) -> bool {
        matches!(label, "success" | "error" | "warning" | "info")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single action attached to a notification.
pub struct Action {
    /// Display name.
    pub name: String,
    /// Name of a registered callback to run when the action is taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    /// Free-form metadata forwarded to the callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Action {
    /// Creates an action with no callback or metadata.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: None,
            metadata: None,
        }
    }

    /// Sets the callback name.
    #[must_use]
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Sets the metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A transient user-facing message with a lifespan.
///
/// Identity and timing fields are private: `created_at` is immutable after
/// construction and the `duration`/`expires_at` pair only changes through
/// [`Notification::reschedule`] and [`Notification::reschedule_until`], which
/// keep `expires_at - created_at == duration` at all times.
pub struct Notification {
    id: String,
    title: Option<String>,
    message: Option<String>,
    category: Category,
    duration_ms: u64,
    created_at_unix_ms: u64,
    expires_at_unix_ms: u64,
    /// Whether the user may dismiss this notification directly.
    pub dismissable: bool,
    /// Ordered actions rendered alongside the message.
    pub actions: Vec<Action>,
}

impl Notification {
    /// Builds a notification from already-minted identity and timing fields.
    ///
    /// Empty strings count as absent text.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotification::MissingContent`] when both `title` and
    /// `message` are empty or absent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        title: Option<String>,
        message: Option<String>,
        category: Category,
        duration_ms: u64,
        created_at_unix_ms: u64,
        dismissable: bool,
        actions: Vec<Action>,
    ) -> Result<Self, InvalidNotification> {
        let title = title.filter(|text| !text.is_empty());
        let message = message.filter(|text| !text.is_empty());
        if title.is_none() && message.is_none() {
            return Err(InvalidNotification::MissingContent);
        }

        Ok(Self {
            id,
            title,
            message,
            category,
            duration_ms,
            created_at_unix_ms,
            expires_at_unix_ms: created_at_unix_ms.saturating_add(duration_ms),
            dismissable,
            actions,
        })
    }

    /// Returns the opaque id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the title text, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the message text, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the lifetime in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Returns the creation time in unix milliseconds.
    pub fn created_at_unix_ms(&self) -> u64 {
        self.created_at_unix_ms
    }

    /// Returns the expiry time in unix milliseconds.
    pub fn expires_at_unix_ms(&self) -> u64 {
        self.expires_at_unix_ms
    }

    /// Changes the duration and recomputes the expiry timestamp atomically.
    pub fn reschedule(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.expires_at_unix_ms = self.created_at_unix_ms.saturating_add(duration_ms);
    }

    /// Moves the expiry timestamp and recomputes the duration atomically.
    ///
    /// An expiry earlier than `created_at` clamps the duration to zero and
    /// pins the expiry back to `created_at`, keeping the derived pair
    /// consistent.
    pub fn reschedule_until(&mut self, expires_at_unix_ms: u64) {
        self.duration_ms = expires_at_unix_ms.saturating_sub(self.created_at_unix_ms);
        self.expires_at_unix_ms = self.created_at_unix_ms.saturating_add(self.duration_ms);
    }

    /// Whether the notification is past its expiry at `now_unix_ms`.
    pub fn is_expired(&self, now_unix_ms: u64) -> bool {
        now_unix_ms > self.expires_at_unix_ms
    }

    /// Fraction of the lifetime elapsed at `now_unix_ms`.
    ///
    /// Unclamped: exceeds 1.0 once expired. Consumers needing a `[0, 1]`
    /// progress bar clamp on their side.
    pub fn expiration_progress(&self, now_unix_ms: u64) -> f64 {
        let elapsed = now_unix_ms.saturating_sub(self.created_at_unix_ms) as f64;
        elapsed / self.duration_ms as f64
    }

    /// Milliseconds of lifetime left at `now_unix_ms`, clamped at zero.
    pub fn remaining_ms(&self, now_unix_ms: u64) -> u64 {
        self.expires_at_unix_ms.saturating_sub(now_unix_ms)
    }

    /// Produces the structural snapshot persisted across reloads.
    pub fn export(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            message: self.message.clone(),
            category: self.category.label().to_string(),
            duration_ms: self.duration_ms,
            created_at_unix_ms: self.created_at_unix_ms,
            expires_at_unix_ms: self.expires_at_unix_ms,
        }
    }

    /// Rebuilds a notification from a persisted snapshot.
    ///
    /// This is the one path where `id`, `created_at`, and `expires_at` are
    /// caller-supplied rather than freshly minted; all three are preserved
    /// verbatim, with the duration derived from the timestamp pair.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotification::MissingContent`] when the snapshot has
    /// neither title nor message.
    pub fn import(snapshot: &NotificationSnapshot) -> Result<Self, InvalidNotification> {
        let mut notification = Notification::new(
            snapshot.id.clone(),
            snapshot.title.clone(),
            snapshot.message.clone(),
            Category::parse_label(&snapshot.category),
            snapshot.duration_ms,
            snapshot.created_at_unix_ms,
            true,
            Vec::new(),
        )?;
        notification.reschedule_until(snapshot.expires_at_unix_ms);
        Ok(notification)
    }
}
