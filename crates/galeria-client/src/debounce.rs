//! Per-key debouncing: a burst of pushes for the same key collapses into
//! the last value, released once the key has been quiet long enough.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<K, V> {
    quiet: Duration,
    pending: HashMap<K, (V, Instant)>,
}

impl<K: Eq + Hash + Clone, V> Debouncer<K, V> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: HashMap::new(),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record a value; restarts the key's quiet period
    pub fn push(&mut self, key: K, value: V, now: Instant) {
        self.pending.insert(key, (value, now));
    }

    /// Take every entry whose quiet period has elapsed, oldest first
    pub fn due(&mut self, now: Instant) -> Vec<(K, V)> {
        let ready: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, (_, at))| now.saturating_duration_since(*at) >= self.quiet)
            .map(|(k, _)| k.clone())
            .collect();

        let mut out: Vec<(K, V, Instant)> = ready
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|(v, at)| (k, v, at)))
            .collect();
        out.sort_by_key(|(_, _, at)| *at);
        out.into_iter().map(|(k, v, _)| (k, v)).collect()
    }

    /// Take everything regardless of timing, oldest first
    pub fn drain(&mut self) -> Vec<(K, V)> {
        let mut out: Vec<(K, V, Instant)> = self
            .pending
            .drain()
            .map(|(k, (v, at))| (k, v, at))
            .collect();
        out.sort_by_key(|(_, _, at)| *at);
        out.into_iter().map(|(k, v, _)| (k, v)).collect()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
