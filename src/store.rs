//! In-memory key-value store.
//!
//! One `Store` holds the string map, the list map and the waiter registry.
//! The whole struct lives behind a single `tokio::sync::Mutex`, so every
//! public method runs as one atomic step with respect to concurrent
//! connections. In particular a push and its wake-up attempt happen under
//! the same guard, and a BLPOP fast-path miss and the waiter registration
//! that follows it cannot be separated by a racing push.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::waiters::{PopResult, WaiterId, WaiterRegistry};

/// A string value with an optional absolute expiry instant.
pub struct StringEntry {
    pub value: String,
    pub expires_at: Option<Instant>,
}

#[derive(Default)]
pub struct Store {
    strings: HashMap<String, StringEntry>,
    lists: HashMap<String, VecDeque<String>>,
    waiters: WaiterRegistry,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous entry. A TTL, when
    /// given, is converted to an absolute deadline at call time.
    pub fn set(&mut self, key: String, value: String, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.strings.insert(key, StringEntry { value, expires_at });
    }

    /// Looks up a string value. Expiry is checked lazily: an entry whose
    /// deadline has passed is deleted here and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let Some(entry) = self.strings.get(key) else {
            return None;
        };

        if let Some(expires_at) = entry.expires_at {
            if Instant::now() >= expires_at {
                self.strings.remove(key);
                return None;
            }
        }

        self.strings.get(key).map(|entry| entry.value.clone())
    }

    /// Appends values at the tail, creating the list if needed, and runs the
    /// wake-up procedure for the new elements. Returns the length right
    /// after the push, before any waiter drains it.
    pub fn rpush(&mut self, key: &str, values: Vec<String>) -> usize {
        let pushed = values.len();
        let list = self.lists.entry(key.to_string()).or_default();
        for value in values {
            list.push_back(value);
        }
        let new_len = list.len();

        self.notify_push(key, pushed);
        new_len
    }

    /// Prepends values one by one, so the last argument ends up leftmost.
    pub fn lpush(&mut self, key: &str, values: Vec<String>) -> usize {
        let pushed = values.len();
        let list = self.lists.entry(key.to_string()).or_default();
        for value in values {
            list.push_front(value);
        }
        let new_len = list.len();

        self.notify_push(key, pushed);
        new_len
    }

    /// Pops the leftmost element. A drained list is removed from the map.
    pub fn lpop_one(&mut self, key: &str) -> Option<String> {
        let list = self.lists.get_mut(key)?;
        let value = list.pop_front();
        if list.is_empty() {
            self.lists.remove(key);
        }
        value
    }

    /// Pops up to `count` leftmost elements, in order. A non-positive count
    /// yields nothing.
    pub fn lpop_many(&mut self, key: &str, count: i64) -> Vec<String> {
        if count <= 0 {
            return Vec::new();
        }

        let Some(list) = self.lists.get_mut(key) else {
            return Vec::new();
        };

        let take = (count as usize).min(list.len());
        let popped: Vec<String> = list.drain(..take).collect();
        if list.is_empty() {
            self.lists.remove(key);
        }
        popped
    }

    /// Returns `list[start..=stop]` with Redis index semantics: negative
    /// indices count from the tail, out-of-range indices are clamped, and an
    /// inverted or out-of-bounds range is empty.
    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Vec<String> {
        let Some(list) = self.lists.get(key) else {
            return Vec::new();
        };

        let len = list.len() as i64;
        let mut start = if start < 0 { len + start } else { start };
        let mut stop = if stop < 0 { len + stop } else { stop };

        start = start.max(0);
        stop = stop.min(len - 1);

        if start >= len || start > stop {
            return Vec::new();
        }

        list.range(start as usize..=stop as usize).cloned().collect()
    }

    pub fn llen(&self, key: &str) -> usize {
        self.lists.get(key).map_or(0, |list| list.len())
    }

    /// BLPOP fast path: scans `keys` in the caller's priority order and pops
    /// from the first non-empty list.
    pub fn pop_first_available(&mut self, keys: &[String]) -> Option<PopResult> {
        for key in keys {
            if let Some(value) = self.lpop_one(key) {
                return Some((key.clone(), value));
            }
        }
        None
    }

    /// Registers a waiter on `keys` after a failed fast path. Must be called
    /// under the same guard as the scan that came up empty.
    pub fn register_waiter(&mut self, keys: Vec<String>) -> (WaiterId, oneshot::Receiver<PopResult>) {
        self.waiters.register(keys)
    }

    /// Retires a waiter whose deadline fired without a delivery.
    pub fn retire_waiter(&mut self, id: WaiterId) {
        self.waiters.retire(id);
    }

    /// Wake-up procedure, run by a push that added `pushed` elements to
    /// `key`. At most one waiter is served per new element. The dequeued
    /// waiter is handed a value from its own key list in priority order, not
    /// necessarily from `key`. A waiter whose lists were all drained in the
    /// meantime is dropped without being re-enqueued; the next push serves
    /// the next waiter in line.
    fn notify_push(&mut self, key: &str, pushed: usize) {
        for _ in 0..pushed {
            if self.llen(key) == 0 {
                break;
            }
            let Some(record) = self.waiters.take_next(key) else {
                break;
            };
            if let Some(result) = self.pop_first_available(&record.keys) {
                // The receiver may have timed out; the value is dropped with
                // the failed send, per the retirement contract.
                let _ = record.sender.send(result);
            }
        }
    }
}
