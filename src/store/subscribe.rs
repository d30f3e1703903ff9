use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

use indexmap::IndexSet;

use crate::store::state::StateRecord;
use crate::store::{DirtyFields, Field};

pub(crate) type SubscriberFn = Arc<dyn Fn(&StateRecord, &DirtyFields) + Send + Sync>;

/// What a subscription listens to.
#[derive(Clone, Debug)]
pub enum Targets {
    /// Every field; delivered whenever the dirty set is non-empty.
    All,
    /// A fixed subset of fields; delivered when the dirty set intersects it.
    Fields(IndexSet<Field>),
}

impl Targets {
    pub fn fields<I: IntoIterator<Item = Field>>(fields: I) -> Self {
        Targets::Fields(fields.into_iter().collect())
    }

    fn matches(&self, dirty: &DirtyFields) -> bool {
        match self {
            Targets::All => !dirty.is_empty(),
            Targets::Fields(set) => set.iter().any(|field| dirty.contains(field)),
        }
    }
}

struct Entry {
    id: usize,
    targets: Targets,
    callback: SubscriberFn,
    active: Arc<AtomicBool>,
}

/// Registry of subscribers for one store.
///
/// Delivery snapshots the subscriber list at flush start, so a callback that
/// registers or cancels subscriptions mid-flush never corrupts the in-flight
/// list: freshly registered callbacks wait for the next flush, cancelled ones
/// are skipped via their active flag.
pub(crate) struct SubscriptionManager {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicUsize,
}

impl SubscriptionManager {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    pub(crate) fn add(self: &Arc<Self>, targets: Targets, callback: SubscriberFn) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        self.entries.write().unwrap().push(Entry {
            id,
            targets,
            callback,
            active: Arc::clone(&active),
        });
        Subscription {
            id,
            active,
            manager: Arc::downgrade(self),
        }
    }

    /// Invoke every matching subscriber, in registration order.
    pub(crate) fn deliver(&self, state: &StateRecord, dirty: &DirtyFields) {
        let snapshot: Vec<(Arc<AtomicBool>, SubscriberFn)> = {
            let entries = self.entries.read().unwrap();
            entries
                .iter()
                .filter(|entry| entry.targets.matches(dirty))
                .map(|entry| (Arc::clone(&entry.active), Arc::clone(&entry.callback)))
                .collect()
        };

        for (active, callback) in snapshot {
            if active.load(Ordering::SeqCst) {
                callback(state, dirty);
            }
        }
    }

    fn remove(&self, id: usize) {
        self.entries.write().unwrap().retain(|entry| entry.id != id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

/// Handle to an active subscription.
///
/// The subscription stays active until [`unsubscribe`](Subscription::unsubscribe)
/// is called or the handle is dropped. Cancellation is idempotent and safe to
/// perform from inside a notification callback.
pub struct Subscription {
    id: usize,
    active: Arc<AtomicBool>,
    manager: Weak<SubscriptionManager>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            if let Some(manager) = self.manager.upgrade() {
                manager.remove(self.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
