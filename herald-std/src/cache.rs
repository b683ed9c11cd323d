//! Memoized dispatch lists.
//!
//! The cache maps `(concrete event type, hierarchical)` to the ordered list of
//! subscriptions eligible for that type. It is a pure, derived view of the
//! registry: every registry mutation clears it wholesale.
//!
//! Entries are tagged with a generation. A mutation bumps the generation
//! while the registry write lock is still held, and [`DispatchCache::put`]
//! refuses lists computed under an older generation. A dispatch that read the
//! registry just before a mutation therefore cannot reinstall a stale list
//! after the flush.

use crate::subscription::Subscription;
use herald_core::{Event, EventType};
use parking_lot::RwLock;
use std::{any::TypeId, collections::HashMap, sync::Arc};

/// An ordered, shareable dispatch list.
pub type DispatchList = Arc<[Subscription]>;

/// Cache key: concrete event type plus the hierarchical-matching flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Concrete type of the posted event.
    pub event_type: TypeId,
    /// Whether supertype listeners were included.
    pub hierarchical: bool,
}

impl CacheKey {
    /// Key for events of type `E`.
    pub fn of<E: Event>(hierarchical: bool) -> Self {
        Self::new(EventType::of::<E>(), hierarchical)
    }

    /// Key for an arbitrary event type.
    pub fn new(event_type: EventType, hierarchical: bool) -> Self {
        Self {
            event_type: event_type.id(),
            hierarchical,
        }
    }
}

#[derive(Default)]
struct CacheState {
    generation: u64,
    entries: HashMap<CacheKey, DispatchList>,
}

/// Per-type dispatch-list cache with coarse invalidation.
#[derive(Default)]
pub struct DispatchCache {
    state: RwLock<CacheState>,
}

impl DispatchCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized list for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<DispatchList> {
        self.state.read().entries.get(key).cloned()
    }

    /// Install `list` for `key` if it is absent and `generation` is current.
    ///
    /// Returns whether the list was installed. Concurrent builders for the
    /// same key compute the same list, so losing the race is harmless.
    pub fn put(&self, key: CacheKey, list: DispatchList, generation: u64) -> bool {
        let mut state = self.state.write();
        if state.generation != generation || state.entries.contains_key(&key) {
            return false;
        }
        state.entries.insert(key, list);
        true
    }

    /// Current generation; pass it back to [`put`](Self::put).
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Drop every entry and start a new generation.
    pub fn invalidate_all(&self) {
        let mut state = self.state.write();
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
    }

    /// Number of memoized lists.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DispatchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("DispatchCache")
            .field("generation", &state.generation)
            .field("entries", &state.entries.len())
            .finish()
    }
}
