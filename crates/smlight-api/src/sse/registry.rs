//! Callback storage for the event client.
//!
//! One callback per [`EventKind`] and one per [`Setting`]. Registering over
//! an existing entry replaces it and logs a warning. Each registration gets
//! a generation number so its [`Disposer`] only ever removes the entry it
//! created.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::{debug, warn};

use super::event::{EventKind, MessageEvent};
use super::settings::{Setting, SettingsEvent};

/// Callback invoked with a raw stream event.
pub type EventCallback = Arc<dyn Fn(&MessageEvent) + Send + Sync>;

/// Callback invoked with one decoded settings change.
pub type SettingsCallback = Arc<dyn Fn(&SettingsEvent) + Send + Sync>;

// ── Slots ────────────────────────────────────────────────────────────

struct Slot<C> {
    generation: u64,
    callback: C,
}

/// Lock-guarded key → callback map.
///
/// Readers clone the callback out and drop the lock before invoking it,
/// so a callback can register or deregister without deadlocking.
struct Slots<K, C> {
    map: RwLock<BTreeMap<K, Slot<C>>>,
}

impl<K, C> Default for Slots<K, C> {
    fn default() -> Self {
        Self {
            map: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord + Copy + fmt::Display, C: Clone> Slots<K, C> {
    fn insert(&self, key: K, generation: u64, callback: C) {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if map.insert(key, Slot { generation, callback }).is_some() {
            warn!(key = %key, "callback already registered, overwriting");
        }
    }

    fn remove(&self, key: &K) -> bool {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(key).is_some()
    }

    fn remove_generation(&self, key: &K, generation: u64) -> bool {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        match map.get(key) {
            Some(slot) if slot.generation == generation => map.remove(key).is_some(),
            _ => false,
        }
    }

    fn get(&self, key: &K) -> Option<C> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).map(|slot| slot.callback.clone())
    }

    /// First entry (in key order) whose key satisfies `pred`.
    fn find(&self, pred: impl Fn(&K) -> bool) -> Option<(K, C)> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.iter()
            .find(|(key, _)| pred(key))
            .map(|(key, slot)| (*key, slot.callback.clone()))
    }

    fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// ── CallbackRegistry ─────────────────────────────────────────────────

/// Callback maps owned by one [`SseClient`](super::SseClient).
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    events: Slots<EventKind, EventCallback>,
    settings: Slots<Setting, SettingsCallback>,
    next_generation: AtomicU64,
}

impl CallbackRegistry {
    fn generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn register_event(self: &Arc<Self>, kind: EventKind, cb: EventCallback) -> Disposer {
        let generation = self.generation();
        self.events.insert(kind, generation, cb);
        debug!(kind = %kind, "registered event callback");
        Disposer {
            registry: Arc::downgrade(self),
            target: Target::Event(kind),
            generation,
        }
    }

    pub(crate) fn register_setting(
        self: &Arc<Self>,
        setting: Setting,
        cb: SettingsCallback,
    ) -> Disposer {
        let generation = self.generation();
        self.settings.insert(setting, generation, cb);
        debug!(setting = %setting, "registered settings callback");
        Disposer {
            registry: Arc::downgrade(self),
            target: Target::Setting(setting),
            generation,
        }
    }

    pub(crate) fn deregister_event(&self, kind: EventKind) -> bool {
        self.events.remove(&kind)
    }

    pub(crate) fn deregister_setting(&self, setting: Setting) -> bool {
        self.settings.remove(&setting)
    }

    pub(crate) fn event_callback(&self, kind: EventKind) -> Option<EventCallback> {
        self.events.get(&kind)
    }

    /// Registered setting callback routed from `(page, key)`, if any.
    pub(crate) fn settings_callback_for(
        &self,
        page: crate::constants::Page,
        key: &str,
    ) -> Option<(Setting, SettingsCallback)> {
        self.settings.find(|setting| setting.matches(page, key))
    }

    pub(crate) fn event_count(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn settings_count(&self) -> usize {
        self.settings.len()
    }
}

// ── Disposer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Event(EventKind),
    Setting(Setting),
}

/// Handle that undoes one registration.
///
/// Removes the callback only if it is still the one this registration
/// installed; calling [`dispose`](Self::dispose) repeatedly, or after the
/// entry was overwritten or the client dropped, does nothing. Dropping a
/// `Disposer` leaves the callback registered.
#[derive(Debug, Clone)]
pub struct Disposer {
    registry: Weak<CallbackRegistry>,
    target: Target,
    generation: u64,
}

impl Disposer {
    /// Deregister the callback this handle was returned for.
    pub fn dispose(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let removed = match self.target {
            Target::Event(kind) => registry.events.remove_generation(&kind, self.generation),
            Target::Setting(setting) => registry
                .settings
                .remove_generation(&setting, self.generation),
        };
        if removed {
            debug!(registration = ?self.target, "callback disposed");
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("events", &self.events.len())
            .field("settings", &self.settings.len())
            .finish_non_exhaustive()
    }
}
