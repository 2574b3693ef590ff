//! Observable ordered collection of live notifications.

use std::{cell::RefCell, rc::Rc};

use crate::notification::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Identifies a live store subscription.
pub struct SubscriptionId(pub(crate) u64);

type Subscriber = Rc<dyn Fn(&[Notification])>;

#[derive(Default)]
struct StoreState {
    entries: Vec<Notification>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

#[derive(Clone, Default)]
/// Shared, ordered collection of live notifications.
///
/// Insertion order is display order. Cloning yields another handle to the
/// same underlying state. Subscribers are notified synchronously after every
/// mutation with the post-mutation list.
pub struct NotificationStore {
    inner: Rc<RefCell<StoreState>>,
}

impl NotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification and notifies subscribers.
    pub fn push(&self, notification: Notification) {
        self.inner.borrow_mut().entries.push(notification);
        self.notify_subscribers();
    }

    /// Removes a notification by id.
    ///
    /// Unknown ids are a no-op without subscriber churn. Returns whether an
    /// entry was removed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut state = self.inner.borrow_mut();
            let before = state.entries.len();
            state.entries.retain(|entry| entry.id() != id);
            state.entries.len() < before
        };
        if removed {
            self.notify_subscribers();
        }
        removed
    }

    /// Looks up a notification by id.
    pub fn get(&self, id: &str) -> Option<Notification> {
        self.inner
            .borrow()
            .entries
            .iter()
            .find(|entry| entry.id() == id)
            .cloned()
    }

    /// Returns a copy of the current ordered list.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.borrow().entries.clone()
    }

    /// Returns the number of live notifications.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether the store holds no notifications.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Registers a subscriber called synchronously after every mutation.
    pub fn subscribe(&self, subscriber: impl Fn(&[Notification]) + 'static) -> SubscriptionId {
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
        // Subscribers run outside the interior borrow so they can read the
        // store from their callbacks.
        let (entries, subscribers) = {
            let state = self.inner.borrow();
            let subscribers = state
                .subscribers
                .iter()
                .map(|(_, subscriber)| Rc::clone(subscriber))
                .collect::<Vec<_>>();
            (state.entries.clone(), subscribers)
        };
        for subscriber in subscribers {
            subscriber(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::notification::Category;

    use super::*;

    fn sample(id: &str) -> Notification {
        Notification::new(
            id.to_string(),
            None,
            Some(format!("message for {id}")),
            Category::Info,
            5_000,
            1_000,
            true,
            Vec::new(),
        )
        .expect("valid notification")
    }

    #[test]
    fn push_preserves_insertion_order() {
        let store = NotificationStore::new();
        store.push(sample("a"));
        store.push(sample("b"));
        store.push(sample("c"));

        let ids: Vec<String> = store
            .snapshot()
            .iter()
            .map(|entry| entry.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let store = NotificationStore::new();
        store.push(sample("a"));

        assert!(store.remove("a"));
        let after_first = store.snapshot();
        assert!(!store.remove("a"));
        assert_eq!(store.snapshot(), after_first);
        assert!(store.is_empty());
    }

    #[test]
    fn subscribers_see_the_post_mutation_list() {
        let store = NotificationStore::new();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();

        let seen_handle = Rc::clone(&seen);
        store.subscribe(move |entries| seen_handle.borrow_mut().push(entries.len()));

        store.push(sample("a"));
        store.push(sample("b"));
        store.remove("a");

        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn removing_an_unknown_id_does_not_notify() {
        let store = NotificationStore::new();
        let calls: Rc<RefCell<usize>> = Rc::default();

        let calls_handle = Rc::clone(&calls);
        store.subscribe(move |_| *calls_handle.borrow_mut() += 1);

        store.remove("ghost");
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn unsubscribe_stops_deliveries() {
        let store = NotificationStore::new();
        let calls: Rc<RefCell<usize>> = Rc::default();

        let calls_handle = Rc::clone(&calls);
        let subscription = store.subscribe(move |_| *calls_handle.borrow_mut() += 1);

        store.push(sample("a"));
        store.unsubscribe(subscription);
        store.push(sample("b"));

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn subscribers_can_read_the_store_reentrantly() {
        let store = NotificationStore::new();
        let observed: Rc<RefCell<usize>> = Rc::default();

        let store_handle = store.clone();
        let observed_handle = Rc::clone(&observed);
        store.subscribe(move |_| {
            *observed_handle.borrow_mut() = store_handle.len();
        });

        store.push(sample("a"));
        assert_eq!(*observed.borrow(), 1);
    }
}
