//! Registry of clients suspended in BLPOP.
//!
//! Each waiter is identified by a process-unique id. The per-key queues hold
//! ids in registration order; the actual records (watched keys plus the
//! single-use response channel) live in a side map so that one waiter can be
//! reachable from several queues without aliasing.

use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

pub type WaiterId = u64;

/// A `(key, value)` pair popped on behalf of a blocked client.
pub type PopResult = (String, String);

/// A suspended BLPOP caller.
///
/// The sender is single-use: a waiter receives at most one value, from at
/// most one key. Dropping the record closes the channel.
pub struct WaiterRecord {
    pub keys: Vec<String>,
    pub sender: oneshot::Sender<PopResult>,
}

#[derive(Default)]
pub struct WaiterRegistry {
    queues: HashMap<String, VecDeque<WaiterId>>,
    records: HashMap<WaiterId, WaiterRecord>,
    next_id: WaiterId,
}

impl WaiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a waiter on every key it watches, in FIFO position, and
    /// hands back the receiving end of its response slot.
    pub fn register(&mut self, keys: Vec<String>) -> (WaiterId, oneshot::Receiver<PopResult>) {
        let id = self.next_id;
        self.next_id += 1;

        let (sender, receiver) = oneshot::channel();

        for key in &keys {
            self.queues.entry(key.clone()).or_default().push_back(id);
        }
        self.records.insert(id, WaiterRecord { keys, sender });

        (id, receiver)
    }

    /// Dequeues the longest-waiting waiter registered on `key`, unlinking it
    /// from every queue it appears in. Returns `None` when nobody is waiting.
    pub fn take_next(&mut self, key: &str) -> Option<WaiterRecord> {
        let id = *self.queues.get(key)?.front()?;
        let record = self.records.remove(&id)?;
        self.unlink(id, &record.keys);
        Some(record)
    }

    /// Removes a waiter whose deadline fired. Dropping the record closes the
    /// response slot, so a racing delivery is discarded by the sender.
    pub fn retire(&mut self, id: WaiterId) {
        if let Some(record) = self.records.remove(&id) {
            self.unlink(id, &record.keys);
        }
    }

    pub fn has_waiters(&self, key: &str) -> bool {
        self.queues.get(key).map_or(false, |queue| !queue.is_empty())
    }

    fn unlink(&mut self, id: WaiterId, keys: &[String]) {
        for key in keys {
            if let Some(queue) = self.queues.get_mut(key) {
                queue.retain(|queued| *queued != id);
                if queue.is_empty() {
                    self.queues.remove(key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_next_is_fifo_per_key() {
        let mut registry = WaiterRegistry::new();

        let (first, _rx1) = registry.register(vec!["queue".to_string()]);
        let (_second, _rx2) = registry.register(vec!["queue".to_string()]);

        let record = registry.take_next("queue").expect("a waiter is registered");
        drop(record);

        // The head waiter was `first`; the second one must still be queued.
        assert!(registry.has_waiters("queue"));
        registry.retire(first); // already removed, must be a no-op
        assert!(registry.has_waiters("queue"));
    }

    #[test]
    fn test_take_next_unlinks_from_all_keys() {
        let mut registry = WaiterRegistry::new();

        let (_id, _rx) = registry.register(vec!["a".to_string(), "b".to_string()]);
        assert!(registry.has_waiters("a"));
        assert!(registry.has_waiters("b"));

        let record = registry.take_next("b").expect("a waiter is registered");
        assert_eq!(record.keys, vec!["a".to_string(), "b".to_string()]);

        assert!(!registry.has_waiters("a"));
        assert!(!registry.has_waiters("b"));
    }

    #[test]
    fn test_retire_removes_waiter_and_empty_queues() {
        let mut registry = WaiterRegistry::new();

        let (id, mut receiver) = registry.register(vec!["a".to_string(), "b".to_string()]);
        registry.retire(id);

        assert!(!registry.has_waiters("a"));
        assert!(!registry.has_waiters("b"));
        // The response slot is closed once the record is gone.
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_take_next_on_idle_key_returns_none() {
        let mut registry = WaiterRegistry::new();
        assert!(registry.take_next("nobody").is_none());
    }
}
