//! Priority-ordered subscription storage.
//!
//! The registry keeps two views of the same subscriptions:
//!
//! - a global list in dispatch order, used for hierarchical matching
//! - a per-type index, used for exact matching
//!
//! Both are ordered the same way: higher priorities first, insertion order
//! within a priority, and every [`Priority::Monitor`] subscription after all
//! non-monitor ones. Every mutation flushes the [`DispatchCache`].

use crate::{
    cache::{CacheKey, DispatchCache, DispatchList},
    subscription::Subscription,
};
use herald_core::{Event, EventType, Priority, SubscriptionId};
use parking_lot::RwLock;
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

#[derive(Default)]
struct RegistryState {
    all: Vec<Subscription>,
    by_type: HashMap<TypeId, Vec<Subscription>>,
}

/// Thread-safe store of subscriptions with a memoized dispatch view.
pub struct SubscriptionRegistry {
    state: RwLock<RegistryState>,
    cache: DispatchCache,
    next_id: AtomicU64,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Position at which a subscription of `priority` joins `list`.
///
/// Monitor subscriptions go to the tail. Anything else is placed before the
/// first entry that is a monitor or has a strictly lower priority, which
/// keeps equal priorities in insertion order.
fn insertion_index(list: &[Subscription], priority: Priority) -> usize {
    if priority.is_monitor() {
        return list.len();
    }
    list.iter()
        .position(|s| s.priority().is_monitor() || priority.runs_before(s.priority()))
        .unwrap_or(list.len())
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            cache: DispatchCache::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate a fresh subscription id.
    pub fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Insert a subscription into both views.
    ///
    /// A subscription whose id is already present is ignored.
    pub fn add(&self, subscription: Subscription) {
        let mut state = self.state.write();
        if state.all.iter().any(|s| s.id() == subscription.id()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                id = %subscription.id(),
                listener = subscription.name(),
                "Subscription id already registered, ignoring"
            );
            return;
        }

        let priority = subscription.priority();
        let at = insertion_index(&state.all, priority);
        state.all.insert(at, subscription.clone());

        let typed = state
            .by_type
            .entry(subscription.event_type().id())
            .or_default();
        let at = insertion_index(typed, priority);
        typed.insert(at, subscription.clone());

        self.cache.invalidate_all();
        drop(state);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = %subscription.id(),
            listener = subscription.name(),
            event = subscription.event_type().short_name(),
            %priority,
            "Subscription added"
        );
    }

    /// Remove a subscription from both views.
    ///
    /// Returns `false` if it was not registered; the cache is left untouched
    /// in that case.
    pub fn remove(&self, subscription: &Subscription) -> bool {
        self.remove_id(subscription.id(), subscription.event_type())
    }

    fn remove_id(&self, id: SubscriptionId, event_type: EventType) -> bool {
        let mut state = self.state.write();
        let Some(at) = state.all.iter().position(|s| s.id() == id) else {
            return false;
        };
        state.all.remove(at);

        if let Some(typed) = state.by_type.get_mut(&event_type.id()) {
            typed.retain(|s| s.id() != id);
            if typed.is_empty() {
                state.by_type.remove(&event_type.id());
            }
        }

        self.cache.invalidate_all();
        drop(state);

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, event = event_type.short_name(), "Subscription removed");
        true
    }

    /// Whether `subscription` is currently registered.
    pub fn contains(&self, subscription: &Subscription) -> bool {
        self.state
            .read()
            .all
            .iter()
            .any(|s| s.id() == subscription.id())
    }

    /// Subscriptions eligible for an event of type `E`, in dispatch order.
    ///
    /// With `hierarchical` set, any subscription registered for `E` or an
    /// entry of `E::lineage()` matches; otherwise only `E` itself does.
    /// Bypasses the cache.
    pub fn all_matching<E: Event>(&self, hierarchical: bool) -> Vec<Subscription> {
        let state = self.state.read();
        Self::collect(&state, EventType::of::<E>(), &E::lineage(), hierarchical)
    }

    fn collect(
        state: &RegistryState,
        concrete: EventType,
        lineage: &[EventType],
        hierarchical: bool,
    ) -> Vec<Subscription> {
        if hierarchical {
            state
                .all
                .iter()
                .filter(|s| s.event_type() == concrete || lineage.contains(&s.event_type()))
                .cloned()
                .collect()
        } else {
            state
                .by_type
                .get(&concrete.id())
                .cloned()
                .unwrap_or_default()
        }
    }

    /// The cached dispatch list for events of type `E`, computing it on a miss.
    pub fn dispatch_list<E: Event>(&self, hierarchical: bool) -> DispatchList {
        let key = CacheKey::of::<E>(hierarchical);
        if let Some(list) = self.cache.get(&key) {
            return list;
        }

        // Read the generation under the same lock as the lists so a mutation
        // cannot slip between them.
        let (list, generation) = {
            let state = self.state.read();
            let list: DispatchList =
                Self::collect(&state, EventType::of::<E>(), &E::lineage(), hierarchical).into();
            (list, self.cache.generation())
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            event = EventType::of::<E>().short_name(),
            hierarchical,
            listeners = list.len(),
            "Dispatch list rebuilt"
        );

        self.cache.put(key, Arc::clone(&list), generation);
        list
    }

    /// Snapshot of every subscription in dispatch order.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state.read().all.clone()
    }

    /// Snapshot of the subscriptions registered for exactly `event_type`.
    pub fn subscriptions_for(&self, event_type: EventType) -> Vec<Subscription> {
        self.state
            .read()
            .by_type
            .get(&event_type.id())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of registered subscriptions.
    pub fn len(&self) -> usize {
        self.state.read().all.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every subscription.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.all.clear();
        state.by_type.clear();
        self.cache.invalidate_all();
    }

    /// The dispatch cache.
    pub fn cache(&self) -> &DispatchCache {
        &self.cache
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SubscriptionRegistry")
            .field("subscriptions", &state.all)
            .field("cache", &self.cache)
            .finish()
    }
}
