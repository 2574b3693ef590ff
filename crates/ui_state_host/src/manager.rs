//! Notification lifecycle management: creation, expiry, persistence.
//!
//! The [`NotificationLifecycleManager`] owns the live notification set. It
//! mints ids, stamps creation times, schedules one expiry timer per
//! notification, and mirrors every mutation into session storage so the queue
//! survives a reload.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use crate::{
    callbacks::CallbackRegistry,
    error::InvalidNotification,
    notification::{Action, Category, Notification},
    rng::IdGenerator,
    scheduler::{ExpiryScheduler, TimerHandle},
    snapshot::{decode_snapshot_batch, encode_snapshot_batch, NOTIFICATION_SNAPSHOT_KEY},
    storage::SessionStore,
    store::NotificationStore,
    time::Clock,
};

/// Default notification lifetime when a request does not specify one.
pub const DEFAULT_DURATION_MS: u64 = 5_000;

#[derive(Debug, Clone)]
/// Parameters for creating one notification.
pub struct NotificationRequest {
    /// Optional title text.
    pub title: Option<String>,
    /// Optional message text. At least one of title/message must be
    /// non-empty.
    pub message: Option<String>,
    /// Category. Loose input spellings normalize through
    /// [`Category::parse_label`].
    pub category: Category,
    /// Lifetime in milliseconds.
    pub duration_ms: u64,
    /// Whether the user may dismiss the notification directly.
    pub dismissable: bool,
    /// Ordered actions rendered alongside the message.
    pub actions: Vec<Action>,
}

impl Default for NotificationRequest {
    fn default() -> Self {
        Self {
            title: None,
            message: None,
            category: Category::Info,
            duration_ms: DEFAULT_DURATION_MS,
            dismissable: true,
            actions: Vec::new(),
        }
    }
}

impl NotificationRequest {
    /// Message-only request with defaults for everything else.
    pub fn message_only(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::default()
        }
    }

    /// Titled request with defaults for everything else.
    pub fn titled(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the lifetime.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Marks the notification as not user-dismissable.
    #[must_use]
    pub fn sticky(mut self) -> Self {
        self.dismissable = false;
        self
    }

    /// Appends an action.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

#[derive(Clone)]
/// Owns the live notification set.
///
/// Cloning yields another handle to the same manager state; expiry timers
/// hold such a handle so a fired timer goes through the same removal path as
/// an explicit dismiss.
pub struct NotificationLifecycleManager {
    store: NotificationStore,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn ExpiryScheduler>,
    session: Rc<dyn SessionStore>,
    ids: Rc<RefCell<IdGenerator>>,
    timers: Rc<RefCell<HashMap<String, TimerHandle>>>,
    persist_warned: Rc<Cell<bool>>,
    hydrated: Rc<Cell<bool>>,
}

impl NotificationLifecycleManager {
    /// Creates a manager over the given store and host services.
    pub fn new(
        store: NotificationStore,
        clock: Rc<dyn Clock>,
        scheduler: Rc<dyn ExpiryScheduler>,
        session: Rc<dyn SessionStore>,
    ) -> Self {
        let base_unix_ms = clock.now_unix_ms();
        Self {
            store,
            clock,
            scheduler,
            session,
            ids: Rc::new(RefCell::new(IdGenerator::new(base_unix_ms))),
            timers: Rc::new(RefCell::new(HashMap::new())),
            persist_warned: Rc::new(Cell::new(false)),
            hydrated: Rc::new(Cell::new(false)),
        }
    }

    /// Returns a handle to the underlying observable store.
    pub fn store(&self) -> NotificationStore {
        self.store.clone()
    }

    /// Creates, registers, and schedules a new notification.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotification::MissingContent`] when the request has
    /// neither a title nor a message.
    pub fn create(
        &self,
        request: NotificationRequest,
    ) -> Result<Notification, InvalidNotification> {
        let id = self.ids.borrow_mut().next_id();
        let created_at = self.clock.now_unix_ms();
        let notification = Notification::new(
            id,
            request.title,
            request.message,
            request.category,
            request.duration_ms,
            created_at,
            request.dismissable,
            request.actions,
        )?;
        self.admit(notification.clone());
        Ok(notification)
    }

    /// Removes a notification by id.
    ///
    /// Unknown ids are a no-op. Returns whether an entry was removed.
    pub fn remove(&self, id: &str) -> bool {
        if let Some(handle) = self.timers.borrow_mut().remove(id) {
            self.scheduler.cancel(handle);
        }
        let removed = self.store.remove(id);
        if removed {
            self.persist();
        }
        removed
    }

    /// User-initiated removal.
    ///
    /// Same contract as [`NotificationLifecycleManager::remove`], with a
    /// telemetry line distinguishing it from automatic expiry.
    pub fn dismiss(&self, id: &str) -> bool {
        let removed = self.remove(id);
        if removed {
            log::debug!("notification {id} dismissed by user");
        }
        removed
    }

    /// Whether `notification` is past its expiry on the manager's clock.
    pub fn is_expired(&self, notification: &Notification) -> bool {
        notification.is_expired(self.clock.now_unix_ms())
    }

    /// Unclamped elapsed-lifetime fraction on the manager's clock.
    pub fn expiration_progress(&self, notification: &Notification) -> f64 {
        notification.expiration_progress(self.clock.now_unix_ms())
    }

    /// Runs the callback registered for `action`, dismissing the notification
    /// when the handler returns `true`.
    ///
    /// Actions without a callback name, and names with no registered handler,
    /// leave the notification in place. Returns whether the notification was
    /// dismissed.
    pub fn invoke_action(
        &self,
        registry: &CallbackRegistry,
        notification: &Notification,
        action: &Action,
    ) -> bool {
        let Some(name) = action.callback.as_deref() else {
            return false;
        };
        if registry.invoke(name, action, notification) == Some(true) {
            self.dismiss(notification.id())
        } else {
            false
        }
    }

    /// Restores the persisted snapshot batch, at most once per manager.
    ///
    /// Absent or unavailable storage restores nothing. Each restored
    /// notification keeps its original fields and is scheduled for its
    /// *remaining* lifetime, so a reloaded queue still expires at the
    /// originally computed deadlines.
    ///
    /// Returns the number of notifications restored.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotification::UnreadableSnapshot`] or
    /// [`InvalidNotification::RejectedBatch`] when a snapshot was present but
    /// rejected; zero notifications are applied in that case and the invalid
    /// count is logged.
    pub fn rehydrate(&self) -> Result<usize, InvalidNotification> {
        if self.hydrated.replace(true) {
            return Ok(0);
        }

        let raw = match self.session.load(NOTIFICATION_SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(0),
            Err(err) => {
                log::warn!("notification snapshot load failed: {err}");
                return Ok(0);
            }
        };

        let snapshots = match decode_snapshot_batch(&raw) {
            Ok(snapshots) => snapshots,
            Err(err) => {
                match &err {
                    InvalidNotification::RejectedBatch { invalid, total } => {
                        log::warn!(
                            "{invalid} invalid notification records of {total} in session snapshot"
                        );
                    }
                    _ => log::warn!("unreadable notification snapshot in session storage"),
                }
                return Err(err);
            }
        };

        let mut restored = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            restored.push(Notification::import(snapshot)?);
        }
        let count = restored.len();
        for notification in restored {
            self.admit(notification);
        }
        Ok(count)
    }

    /// Registers an already-built notification and schedules its remaining
    /// lifetime. Shared by creation and rehydration.
    fn admit(&self, notification: Notification) {
        let id = notification.id().to_string();
        let remaining = notification.remaining_ms(self.clock.now_unix_ms());
        self.store.push(notification);

        let manager = self.clone();
        let timer_id = id.clone();
        let handle = self.scheduler.schedule(
            remaining,
            Box::new(move || {
                manager.remove(&timer_id);
            }),
        );
        self.timers.borrow_mut().insert(id, handle);
        self.persist();
    }

    /// Mirrors the live set into session storage, best-effort.
    fn persist(&self) {
        let encoded = match encode_snapshot_batch(&self.store.snapshot()) {
            Ok(encoded) => encoded,
            Err(err) => {
                log::warn!("notification snapshot encode failed: {err}");
                return;
            }
        };
        if let Err(err) = self.session.save(NOTIFICATION_SNAPSHOT_KEY, &encoded) {
            // Unavailable persistence is a soft condition; warn once.
            if !self.persist_warned.replace(true) {
                log::warn!("notification persistence unavailable: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::{
        scheduler::ManualScheduler,
        storage::{MemorySessionStore, NoopSessionStore},
        time::ManualClock,
    };

    use super::*;

    struct Harness {
        manager: NotificationLifecycleManager,
        clock: ManualClock,
        scheduler: ManualScheduler,
        session: MemorySessionStore,
    }

    impl Harness {
        fn starting_at(now_ms: u64) -> Self {
            Self::with_session(now_ms, MemorySessionStore::default())
        }

        fn with_session(now_ms: u64, session: MemorySessionStore) -> Self {
            let clock = ManualClock::starting_at(now_ms);
            let scheduler = ManualScheduler::starting_at(now_ms);
            let manager = NotificationLifecycleManager::new(
                NotificationStore::new(),
                Rc::new(clock.clone()),
                Rc::new(scheduler.clone()),
                Rc::new(session.clone()),
            );
            Self {
                manager,
                clock,
                scheduler,
                session,
            }
        }

        /// Moves both virtual timelines forward together.
        fn elapse(&self, delta_ms: u64) {
            self.clock.advance(delta_ms);
            self.scheduler.advance(delta_ms);
        }

        fn persisted_records(&self) -> Vec<serde_json::Value> {
            let raw = self
                .session
                .load(NOTIFICATION_SNAPSHOT_KEY)
                .expect("session load")
                .expect("snapshot present");
            serde_json::from_str(&raw).expect("snapshot is a JSON array")
        }
    }

    #[test]
    fn create_registers_an_unexpired_notification() {
        let harness = Harness::starting_at(1_000);
        let notification = harness
            .manager
            .create(NotificationRequest::message_only("saved"))
            .expect("create succeeds");

        assert!(!harness.manager.is_expired(&notification));
        assert_eq!(notification.duration_ms(), DEFAULT_DURATION_MS);
        assert_eq!(notification.created_at_unix_ms(), 1_000);
        assert_eq!(harness.manager.store().len(), 1);
    }

    #[test]
    fn create_without_content_fails() {
        let harness = Harness::starting_at(1_000);
        let err = harness
            .manager
            .create(NotificationRequest::default())
            .expect_err("expected missing content");
        assert_eq!(err, InvalidNotification::MissingContent);
        assert!(harness.manager.store().is_empty());
    }

    #[test]
    fn created_ids_are_distinct() {
        let harness = Harness::starting_at(1_000);
        let ids: HashSet<String> = (0..1_000)
            .map(|index| {
                harness
                    .manager
                    .create(NotificationRequest::message_only(format!("m{index}")))
                    .expect("create succeeds")
                    .id()
                    .to_string()
            })
            .collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn expiry_timer_removes_the_notification() {
        let harness = Harness::starting_at(10_000);
        let notification = harness
            .manager
            .create(NotificationRequest::message_only("short-lived").with_duration_ms(100))
            .expect("create succeeds");

        harness.elapse(99);
        assert_eq!(harness.manager.store().len(), 1);
        assert!(!harness.manager.is_expired(&notification));

        harness.elapse(2);
        assert!(harness.manager.is_expired(&notification));
        assert!(harness.manager.store().is_empty());
    }

    #[test]
    fn remove_is_idempotent_and_cancels_the_timer() {
        let harness = Harness::starting_at(1_000);
        let notification = harness
            .manager
            .create(NotificationRequest::message_only("to remove"))
            .expect("create succeeds");

        assert!(harness.manager.remove(notification.id()));
        assert_eq!(harness.scheduler.pending_count(), 0);
        assert!(!harness.manager.remove(notification.id()));
        assert!(harness.manager.store().is_empty());

        // The fired-timer path stays harmless after explicit removal.
        harness.elapse(DEFAULT_DURATION_MS + 1);
    }

    #[test]
    fn dismiss_matches_the_remove_contract() {
        let harness = Harness::starting_at(1_000);
        let notification = harness
            .manager
            .create(NotificationRequest::message_only("to dismiss"))
            .expect("create succeeds");

        assert!(harness.manager.dismiss(notification.id()));
        assert!(!harness.manager.dismiss(notification.id()));
        assert!(harness.manager.store().is_empty());
    }

    #[test]
    fn expiration_progress_tracks_the_manager_clock() {
        let harness = Harness::starting_at(1_000);
        let notification = harness
            .manager
            .create(NotificationRequest::message_only("progress").with_duration_ms(200))
            .expect("create succeeds");

        assert_eq!(harness.manager.expiration_progress(&notification), 0.0);
        harness.clock.advance(100);
        assert_eq!(harness.manager.expiration_progress(&notification), 0.5);
        harness.clock.advance(300);
        assert_eq!(harness.manager.expiration_progress(&notification), 2.0);
    }

    #[test]
    fn every_mutation_is_mirrored_to_session_storage() {
        let harness = Harness::starting_at(1_000);
        let first = harness
            .manager
            .create(NotificationRequest::message_only("one"))
            .expect("create succeeds");
        harness
            .manager
            .create(NotificationRequest::message_only("two"))
            .expect("create succeeds");
        assert_eq!(harness.persisted_records().len(), 2);

        harness.manager.remove(first.id());
        let records = harness.persisted_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], json!("two"));
    }

    #[test]
    fn rehydration_restores_fields_and_original_deadlines() {
        let session = MemorySessionStore::default();
        let writer = Harness::with_session(1_000, session.clone());
        for (message, duration_ms) in [("a", 2_000), ("b", 5_000), ("c", 8_000)] {
            writer
                .manager
                .create(
                    NotificationRequest::message_only(message).with_duration_ms(duration_ms),
                )
                .expect("create succeeds");
        }
        let originals = writer.manager.store().snapshot();

        // Reload 4 seconds later: "a" (expires at 3_000) is already past due.
        let reader = Harness::with_session(4_000, session);
        let restored = reader.manager.rehydrate().expect("rehydrate succeeds");
        assert_eq!(restored, 3);

        let entries = reader.manager.store().snapshot();
        assert_eq!(
            entries.iter().map(Notification::export).collect::<Vec<_>>(),
            originals.iter().map(Notification::export).collect::<Vec<_>>()
        );

        // Expiry fires at the original deadlines, not now + duration.
        reader.scheduler.advance(0);
        assert_eq!(reader.manager.store().len(), 2);

        reader.elapse(2_000); // now 6_000, "b" expires
        assert_eq!(reader.manager.store().len(), 1);

        reader.elapse(2_999);
        assert_eq!(reader.manager.store().len(), 1);
        reader.elapse(1); // now 9_000, "c" expires
        assert!(reader.manager.store().is_empty());
    }

    #[test]
    fn rehydration_rejects_a_batch_with_one_bad_record() {
        let session = MemorySessionStore::default();
        let writer = Harness::with_session(1_000, session.clone());
        for message in ["a", "b", "c"] {
            writer
                .manager
                .create(NotificationRequest::message_only(message))
                .expect("create succeeds");
        }

        // Corrupt the middle record's duration in place.
        let raw = session
            .load(NOTIFICATION_SNAPSHOT_KEY)
            .expect("session load")
            .expect("snapshot present");
        let mut records: Vec<serde_json::Value> =
            serde_json::from_str(&raw).expect("snapshot array");
        records[1]["duration_ms"] = json!("five thousand");
        session
            .save(
                NOTIFICATION_SNAPSHOT_KEY,
                &serde_json::to_string(&records).expect("serialize"),
            )
            .expect("session save");

        let reader = Harness::with_session(2_000, session);
        let err = reader
            .manager
            .rehydrate()
            .expect_err("batch must be rejected");
        assert_eq!(
            err,
            InvalidNotification::RejectedBatch {
                invalid: 1,
                total: 3
            }
        );
        assert!(reader.manager.store().is_empty());
        assert_eq!(reader.scheduler.pending_count(), 0);
    }

    #[test]
    fn rehydration_runs_at_most_once() {
        let session = MemorySessionStore::default();
        let writer = Harness::with_session(1_000, session.clone());
        writer
            .manager
            .create(NotificationRequest::message_only("only"))
            .expect("create succeeds");

        let reader = Harness::with_session(1_500, session);
        assert_eq!(reader.manager.rehydrate().expect("first"), 1);
        assert_eq!(reader.manager.rehydrate().expect("second"), 0);
        assert_eq!(reader.manager.store().len(), 1);
    }

    #[test]
    fn rehydration_with_no_snapshot_restores_nothing() {
        let harness = Harness::starting_at(1_000);
        assert_eq!(harness.manager.rehydrate().expect("rehydrate"), 0);
        assert!(harness.manager.store().is_empty());
    }

    #[test]
    fn missing_storage_surface_is_a_soft_skip() {
        let clock = ManualClock::starting_at(1_000);
        let scheduler = ManualScheduler::starting_at(1_000);
        let manager = NotificationLifecycleManager::new(
            NotificationStore::new(),
            Rc::new(clock),
            Rc::new(scheduler),
            Rc::new(NoopSessionStore),
        );

        manager
            .create(NotificationRequest::message_only("unpersisted"))
            .expect("create succeeds");
        assert_eq!(manager.store().len(), 1);
        assert_eq!(manager.rehydrate().expect("rehydrate"), 0);
    }

    #[test]
    fn a_failing_storage_surface_does_not_break_mutations() {
        struct FailingSessionStore;

        impl SessionStore for FailingSessionStore {
            fn load(&self, _key: &str) -> Result<Option<String>, String> {
                Err("quota exceeded".to_string())
            }
            fn save(&self, _key: &str, _raw: &str) -> Result<(), String> {
                Err("quota exceeded".to_string())
            }
            fn delete(&self, _key: &str) -> Result<(), String> {
                Err("quota exceeded".to_string())
            }
        }

        let clock = ManualClock::starting_at(1_000);
        let scheduler = ManualScheduler::starting_at(1_000);
        let manager = NotificationLifecycleManager::new(
            NotificationStore::new(),
            Rc::new(clock),
            Rc::new(scheduler),
            Rc::new(FailingSessionStore),
        );

        let notification = manager
            .create(NotificationRequest::message_only("still works"))
            .expect("create succeeds");
        assert!(manager.remove(notification.id()));
        assert_eq!(manager.rehydrate().expect("load failure is soft"), 0);
    }

    #[test]
    fn invoke_action_dismisses_when_the_handler_asks() {
        let harness = Harness::starting_at(1_000);
        let registry = CallbackRegistry::new();
        registry.register("ack", |_, _| true);
        registry.register("noop", |_, _| false);

        let ack = Action::named("Acknowledge").with_callback("ack");
        let noop = Action::named("Later").with_callback("noop");
        let bare = Action::named("Bare");
        let notification = harness
            .manager
            .create(
                NotificationRequest::titled("Update", "A new version is available")
                    .with_action(ack.clone())
                    .with_action(noop.clone())
                    .with_action(bare.clone()),
            )
            .expect("create succeeds");

        assert!(!harness.manager.invoke_action(&registry, &notification, &bare));
        assert!(!harness.manager.invoke_action(&registry, &notification, &noop));
        assert_eq!(harness.manager.store().len(), 1);

        assert!(harness.manager.invoke_action(&registry, &notification, &ack));
        assert!(harness.manager.store().is_empty());
    }
}
