//! Change notifications without payload.
//!
//! Observers either register a callback (and later unregister it with the
//! returned id) or hold a `watch` receiver whose version bumps on every change.
//! In both cases observers re-pull whatever they display.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Handle returned by [`Notifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Registry of change observers
pub struct Notifier {
    next_id: AtomicU64,
    callbacks: Mutex<BTreeMap<SubscriptionId, Callback>>,
    version: watch::Sender<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            next_id: AtomicU64::new(0),
            callbacks: Mutex::new(BTreeMap::new()),
            version,
        }
    }

    /// Register a callback run on every change
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::new(callback));
        id
    }

    /// Remove a callback; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some()
    }

    /// Receiver that observes a change counter; dropping it unsubscribes
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Signal every observer that the backing collection changed
    pub fn notify(&self) {
        self.version.send_modify(|version| *version += 1);

        // Callbacks run outside the lock so they may (un)subscribe.
        let callbacks: Vec<Callback> = self
            .callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .field("version", &*self.version.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_notify_unsubscribe() {
        let notifier = Notifier::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let id = notifier.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.notify();
        notifier.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_watch_receiver_sees_changes() {
        let notifier = Notifier::new();
        let mut rx = notifier.watch();
        assert!(!rx.has_changed().unwrap());

        notifier.notify();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn test_notify_without_observers() {
        let notifier = Notifier::default();
        notifier.notify();
        assert_eq!(*notifier.watch().borrow(), 1);
    }
}
