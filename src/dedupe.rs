//! Deduplication cache for trigger event identifiers.
//!
//! Webhook providers may redeliver the same logical event under retry, so
//! the coordinator remembers recently processed event IDs and skips
//! duplicates. The cache is advisory and volatile: it suppresses duplicate
//! redeliveries within a process lifetime, it does not provide durable
//! idempotency.
//!
//! # Eviction
//!
//! The cache is capacity-bounded. When an insert would exceed the capacity,
//! the oldest half of the entries (by insertion order) is evicted in one
//! pass before inserting. Recency of *access* is deliberately not tracked;
//! batch eviction is simpler than LRU and good enough for a bounded memory
//! of recent deliveries.

use std::collections::{HashSet, VecDeque};

use crate::types::EventId;

/// Default capacity of the dedup cache.
pub const MAX_CACHE_SIZE: usize = 1000;

/// A bounded, insertion-ordered set of recently processed event IDs.
#[derive(Debug)]
pub struct EventDedupCache {
    capacity: usize,
    seen: HashSet<EventId>,
    order: VecDeque<EventId>,
}

impl Default for EventDedupCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDedupCache {
    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_SIZE)
    }

    /// Creates a cache with a custom capacity.
    ///
    /// A capacity of zero is clamped to one so that the most recent event
    /// is always remembered.
    pub fn with_capacity(capacity: usize) -> Self {
        EventDedupCache {
            capacity: capacity.max(1),
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns true if the given event ID has been marked processed.
    pub fn is_processed(&self, id: &EventId) -> bool {
        self.seen.contains(id)
    }

    /// Marks an event ID as processed.
    ///
    /// If the cache is at capacity, the oldest half of the entries is
    /// evicted first. Marking an ID that is already present is a no-op.
    pub fn mark_processed(&mut self, id: EventId) {
        if self.seen.contains(&id) {
            return;
        }
        if self.order.len() >= self.capacity {
            self.evict_oldest_half();
        }
        self.seen.insert(id.clone());
        self.order.push_back(id);
    }

    /// Returns the number of IDs currently remembered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Evicts the oldest `capacity / 2` entries in one pass.
    fn evict_oldest_half(&mut self) {
        // For capacity 1 this still frees one slot.
        let batch = (self.capacity / 2).max(1);
        for _ in 0..batch {
            match self.order.pop_front() {
                Some(old) => {
                    self.seen.remove(&old);
                }
                None => break,
            }
        }
    }
}
