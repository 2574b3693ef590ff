//! Typed UI-state contracts and core logic for the client front end.
//!
//! This crate is the API-first boundary for client-side UI state. It owns the
//! notification model and lifecycle manager, the observable stores consumed by
//! the rendering layer, id generation, session persistence contracts with
//! in-memory baseline adapters, and the signed-in user-context models.
//! Concrete browser adapters live in `ui_state_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod callbacks;
pub mod context;
pub mod error;
pub mod manager;
pub mod notification;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod time;

pub use callbacks::{callback_registry, ActionCallback, CallbackRegistry};
pub use context::{
    hydrate_user_context, Channel, ChannelVersion, UserContext, UserContextStore, UserRank,
    USER_CONTEXT_KEY,
};
pub use error::InvalidNotification;
pub use manager::{NotificationLifecycleManager, NotificationRequest, DEFAULT_DURATION_MS};
pub use notification::{Action, Category, Notification};
pub use rng::{IdGenerator, Jsf32};
pub use scheduler::{ExpiryScheduler, ManualScheduler, NoopScheduler, TimerHandle};
pub use snapshot::{
    decode_snapshot_batch, encode_snapshot_batch, is_valid_record, NotificationSnapshot,
    NOTIFICATION_SNAPSHOT_KEY,
};
pub use storage::{MemorySessionStore, NoopSessionStore, SessionStore};
pub use store::{NotificationStore, SubscriptionId};
pub use time::{unix_time_ms_now, Clock, ManualClock, SharedClock, SystemClock};
