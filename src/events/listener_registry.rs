//! Synchronous listener registry for personality changes.
//!
//! Listeners are plain closures invoked inline, in registration order, on the
//! thread that mutated the state. There is no queue and no background
//! runtime. A listener that panics is caught and logged; the remaining
//! listeners still run and the mutating caller never observes the panic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::personality_events::PersonalityChangedEvent;

/// A personality change listener.
pub type Listener = Arc<dyn Fn(&PersonalityChangedEvent) + Send + Sync>;

static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`ListenerRegistry::subscribe`].
#[derive(Clone)]
pub struct ListenerId {
    /// Human-readable name.
    pub name: String,
    id: u64,
}

impl ListenerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({}:{})", self.id, self.name)
    }
}

impl PartialEq for ListenerId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ListenerId {}

impl std::hash::Hash for ListenerId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Ordered set of listeners.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    entries: Vec<(ListenerId, Listener)>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It runs after every listener registered before it.
    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        listener: impl Fn(&PersonalityChangedEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId::new(name);
        self.entries.push((id.clone(), Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: &ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every listener.
    ///
    /// Returns how many listeners returned normally.
    pub fn emit(&self, event: &PersonalityChangedEvent) -> usize {
        let mut delivered = 0;
        for (id, listener) in &self.entries {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener(event);
            }));
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    let reason = e
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| e.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    log::error!("[ListenerRegistry] Listener {:?} panicked: {}", id, reason);
                }
            }
        }
        delivered
    }
}
