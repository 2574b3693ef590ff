//! User-context models and their observable store.
//!
//! These types mirror the backend's wire payload and are deserialize-only;
//! the client never writes them back. Field names follow the wire format via
//! serde renames.

use std::{cell::RefCell, rc::Rc};

use serde::Deserialize;

use crate::{storage::SessionStore, store::SubscriptionId};

/// Storage key holding the serialized user context from the last session.
pub const USER_CONTEXT_KEY: &str = "ui.user_context.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Privilege tier reported by the backend.
///
/// The wire spelling is uppercase (`"ADMIN"`, `"STAFF"`, ...).
pub enum UserRank {
    /// Full administrative access.
    Admin,
    /// Internal staff.
    Staff,
    /// Beta-program participant.
    Beta,
    /// Regular user.
    User,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// One published build within a release channel.
pub struct ChannelVersion {
    /// Backend identifier for the version document.
    #[serde(rename = "_id")]
    pub id: String,
    /// Human-readable version name.
    pub name: String,
    /// Release notes.
    pub changelog: String,
    /// Publication time, unix milliseconds.
    #[serde(rename = "releasedAt")]
    pub released_at_unix_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// A release channel the user may install from.
pub struct Channel {
    /// Channel name.
    pub name: String,
    /// Channel description.
    pub description: String,
    /// Name of the newest version in the channel.
    #[serde(rename = "latestVersion")]
    pub latest_version: String,
    /// Last channel update, unix milliseconds.
    #[serde(rename = "lastUpdated")]
    pub last_updated_unix_ms: u64,
    /// Every version currently published in the channel.
    #[serde(rename = "availableVersions")]
    pub versions: Vec<ChannelVersion>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// The signed-in user's identity and entitlements.
pub struct UserContext {
    /// Account name.
    pub username: String,
    /// Privilege tier.
    pub rank: UserRank,
    /// Channels the account may install from.
    #[serde(rename = "available_channels")]
    pub channels: Vec<Channel>,
}

impl UserContext {
    /// Parses a user context from its wire JSON.
    ///
    /// # Errors
    ///
    /// Returns a message describing the parse failure.
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("invalid user context payload: {e}"))
    }
}

type ContextSubscriber = Rc<dyn Fn(Option<&UserContext>)>;

#[derive(Default)]
struct ContextState {
    context: Option<UserContext>,
    subscribers: Vec<(SubscriptionId, ContextSubscriber)>,
    next_subscription: u64,
}

#[derive(Clone, Default)]
/// Observable holder for the current [`UserContext`].
///
/// Starts empty; `None` means signed out or not yet hydrated. Clones share
/// the same underlying state. Subscribers are notified synchronously on every
/// [`UserContextStore::set`].
pub struct UserContextStore {
    inner: Rc<RefCell<ContextState>>,
}

impl UserContextStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current context, if any.
    pub fn get(&self) -> Option<UserContext> {
        self.inner.borrow().context.clone()
    }

    /// Replaces the current context and notifies subscribers.
    pub fn set(&self, context: Option<UserContext>) {
        self.inner.borrow_mut().context = context;
        self.notify_subscribers();
    }

    /// Registers a subscriber called synchronously on every update.
    pub fn subscribe(&self, subscriber: impl Fn(Option<&UserContext>) + 'static) -> SubscriptionId {
        let mut state = self.inner.borrow_mut();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.subscribers.push((id, Rc::new(subscriber)));
        id
    }

    /// Drops a subscriber; unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|(existing, _)| *existing != id);
    }

    fn notify_subscribers(&self) {
        let (context, subscribers) = {
            let state = self.inner.borrow();
            let subscribers = state
                .subscribers
                .iter()
                .map(|(_, subscriber)| Rc::clone(subscriber))
                .collect::<Vec<_>>();
            (state.context.clone(), subscribers)
        };
        for subscriber in subscribers {
            subscriber(context.as_ref());
        }
    }
}

/// Restores the persisted user context into `store`, if one is stored.
///
/// Absent storage and absent keys are silent. Unreadable storage and corrupt
/// payloads leave the store untouched and log a warning. Returns whether a
/// context was restored.
pub fn hydrate_user_context(store: &UserContextStore, session: &dyn SessionStore) -> bool {
    let raw = match session.load(USER_CONTEXT_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return false,
        Err(err) => {
            log::warn!("user context load failed: {err}");
            return false;
        }
    };
    match UserContext::from_json_str(&raw) {
        Ok(context) => {
            log::debug!("restored user context for {}", context.username);
            store.set(Some(context));
            true
        }
        Err(err) => {
            log::warn!("discarding persisted user context: {err}");
            false
        }
    }
}
