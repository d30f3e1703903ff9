use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};

use indexmap::{IndexMap, IndexSet};

use crate::error::StoreError;
use crate::store::batch::Batcher;
use crate::store::controlled::ControlledProp;
use crate::store::state::StateRecord;
use crate::store::subscribe::{Subscription, SubscriptionManager, Targets};
use crate::value::Value;

/// A field name. Field names are compile-time literals supplied by widget
/// store factories.
pub type Field = &'static str;

/// The set of fields that changed during the current batch, in the order the
/// changes were first observed.
pub type DirtyFields = IndexSet<Field>;

/// An action registered on a store by name.
///
/// Actions are written against the generic [`Store`] API. When a composed
/// store re-exports a constituent's action, the closure is invoked with the
/// composed store, so its field writes route back to the constituent that
/// owns them and batch at the composed level.
pub type ActionFn = Arc<dyn Fn(&Store, &[Value]) + Send + Sync>;

/// Which store applies a write to a given field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Owner {
    /// The store's own record.
    Local,
    /// A constituent part, by index.
    Part(usize),
}

/// Read/write routing for one field of a (possibly composed) store.
///
/// `writers` lists every owner carrying the field in composition order, so a
/// write to a collided field reaches all shadowed copies and they never
/// drift. `reader` is the last writer; composition order is the tie-break
/// rule, last writer wins.
#[derive(Clone, Debug)]
pub(crate) struct Route {
    pub(crate) reader: Owner,
    pub(crate) writers: Vec<Owner>,
}

impl Route {
    pub(crate) fn local() -> Self {
        Self {
            reader: Owner::Local,
            writers: vec![Owner::Local],
        }
    }
}

pub(crate) struct StoreInner {
    pub(crate) parts: Vec<Store>,
    pub(crate) local: RwLock<StateRecord>,
    pub(crate) routes: IndexMap<Field, Route>,
    pub(crate) actions: IndexMap<&'static str, ActionFn>,
    pub(crate) controlled: IndexMap<Field, ControlledProp>,
    pub(crate) subscriptions: Arc<SubscriptionManager>,
    pub(crate) batcher: Batcher,
    /// Forwarding bridges into constituent parts and controlled-setter
    /// subscriptions. Dropped with the store, which unhooks them from the
    /// parts' subscription managers.
    pub(crate) wiring: Mutex<Vec<Subscription>>,
}

/// A unit of widget state plus the actions allowed to mutate it.
///
/// `Store` is a cheap handle; clones share the same underlying state,
/// subscription manager and batching scheduler. A base store owns a flat
/// record with a key set fixed at construction. A composed store (see
/// [`StoreBuilder`](crate::StoreBuilder)) is a view over its constituent
/// parts' records plus its own extra fields.
///
/// All mutation and notification is synchronous and runs on the caller's
/// thread of control; subscribers are notified in registration order after
/// every mutation of a batch has been applied.
pub struct Store {
    pub(crate) inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("fields", &self.inner.routes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Store {
    /// Create a base store with the given initial state and no actions.
    pub fn new(state: StateRecord) -> Self {
        let routes = state.keys().map(|field| (field, Route::local())).collect();
        Self {
            inner: Arc::new(StoreInner {
                parts: Vec::new(),
                local: RwLock::new(state),
                routes,
                actions: IndexMap::new(),
                controlled: IndexMap::new(),
                subscriptions: Arc::new(SubscriptionManager::new()),
                batcher: Batcher::new(),
                wiring: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Start building a store with parts, actions and controlled bindings.
    pub fn builder() -> crate::store::compose::StoreBuilder {
        crate::store::compose::StoreBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    /// Snapshot the current state.
    ///
    /// Fields owned by constituent parts are read through the parts;
    /// controlled fields read through their external getters. Callers must
    /// treat the snapshot as immutable.
    pub fn get_state(&self) -> StateRecord {
        let parts: Vec<StateRecord> = self.inner.parts.iter().map(Store::get_state).collect();
        let mut record = StateRecord::with_capacity(self.inner.routes.len());
        {
            let local = self.inner.local.read().unwrap();
            for (field, route) in &self.inner.routes {
                let value = match route.reader {
                    Owner::Local => local.get(field).cloned().unwrap_or(Value::Null),
                    Owner::Part(i) => parts[i].get(field).cloned().unwrap_or(Value::Null),
                };
                record.insert(field, value);
            }
        }
        for (field, prop) in &self.inner.controlled {
            if let Some(value) = prop.external_value() {
                record.insert(field, value);
            }
        }
        record
    }

    /// Read one field, with controlled read-through.
    ///
    /// # Panics
    ///
    /// Panics on a field outside the store's key set; that is a program
    /// defect, like an out-of-bounds index. Use [`try_get`](Store::try_get)
    /// for dynamic lookups.
    pub fn get(&self, field: Field) -> Value {
        match self.try_get(field) {
            Some(value) => value,
            None => panic!("{}", StoreError::InvalidField(field)),
        }
    }

    pub fn try_get(&self, field: Field) -> Option<Value> {
        if let Some(prop) = self.inner.controlled.get(field) {
            if let Some(value) = prop.external_value() {
                return Some(value);
            }
        }
        self.raw_get(field)
    }

    /// Read the internal value of a field, skipping controlled read-through.
    pub(crate) fn raw_get(&self, field: Field) -> Option<Value> {
        let route = self.inner.routes.get(field)?;
        match route.reader {
            Owner::Local => Some(
                self.inner
                    .local
                    .read()
                    .unwrap()
                    .get(field)
                    .cloned()
                    .unwrap_or(Value::Null),
            ),
            Owner::Part(i) => self.inner.parts[i].raw_get(field),
        }
    }

    /// The store's key set, in exposed order.
    pub fn fields(&self) -> Vec<Field> {
        self.inner.routes.keys().copied().collect()
    }

    /// The names of every registered action, in exposed order.
    pub fn actions(&self) -> Vec<&'static str> {
        self.inner.actions.keys().copied().collect()
    }

    /// Apply a partial update.
    ///
    /// Each pair whose value differs from the current one (primitives by
    /// value, lists and handles by identity) is applied and marked dirty;
    /// unchanged pairs are left untouched and produce no notification. The
    /// whole partial runs as one batch, so subscribers see a single
    /// notification covering every field that changed.
    ///
    /// Intended to be called from within the store's own actions; external
    /// code mutates a store only through its actions.
    ///
    /// # Panics
    ///
    /// Panics on a field outside the store's key set.
    pub fn set_state<I>(&self, partial: I)
    where
        I: IntoIterator<Item = (Field, Value)>,
    {
        if let Err(err) = self.try_set_state(partial) {
            panic!("{err}");
        }
    }

    pub fn try_set_state<I>(&self, partial: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (Field, Value)>,
    {
        let partial: Vec<(Field, Value)> = partial.into_iter().collect();
        self.batch(|| self.apply(partial))
    }

    fn apply(&self, partial: Vec<(Field, Value)>) -> Result<(), StoreError> {
        // Route every pair before touching any state, so an invalid field
        // fails the whole partial rather than applying a prefix of it.
        let mut local_changes: Vec<(Field, Value)> = Vec::new();
        let mut part_changes: Vec<Vec<(Field, Value)>> = vec![Vec::new(); self.inner.parts.len()];
        for (field, value) in partial {
            let route = self
                .inner
                .routes
                .get(field)
                .ok_or(StoreError::InvalidField(field))?;
            for owner in &route.writers {
                match *owner {
                    Owner::Local => local_changes.push((field, value.clone())),
                    Owner::Part(i) => part_changes[i].push((field, value.clone())),
                }
            }
        }

        let mut changed = DirtyFields::new();
        {
            let mut local = self.inner.local.write().unwrap();
            for (field, value) in local_changes {
                let differs = local.get(field).map_or(true, |old| !old.same(&value));
                if differs {
                    local.insert(field, value);
                    changed.insert(field);
                }
            }
        }
        if !changed.is_empty() {
            self.mark_dirty(changed);
        }

        // Part-owned fields go through the parts' own equality checks; their
        // dirty sets fold back into this batch through the bridges.
        for (i, changes) in part_changes.into_iter().enumerate() {
            if !changes.is_empty() {
                self.inner.parts[i].try_set_state(changes)?;
            }
        }
        Ok(())
    }

    /// Fold dirty fields into the current batch, flushing when none is open.
    pub(crate) fn mark_dirty<I: IntoIterator<Item = Field>>(&self, fields: I) {
        self.inner.batcher.mark(fields);
        if self.inner.batcher.idle() {
            self.flush();
        }
    }

    /// Run `f` as one batch: every mutation inside accumulates dirty fields
    /// and subscribers are notified once, after `f` returns. Nested calls run
    /// inline and the outermost batch owns the flush.
    ///
    /// If `f` panics the batch still closes: mutations already applied remain
    /// applied and are flushed to subscribers, then the panic resumes. There
    /// is no rollback.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.batcher.enter();
        let result = catch_unwind(AssertUnwindSafe(f));
        if self.inner.batcher.exit() == 0 {
            self.flush();
        }
        match result {
            Ok(value) => value,
            Err(payload) => resume_unwind(payload),
        }
    }

    fn flush(&self) {
        if !self.inner.batcher.begin_flush() {
            // Already flushing: the running flush loop picks the new dirty
            // fields up as its next pass.
            return;
        }
        // A panicking subscriber must not leave the flushing flag set, or
        // every later batch would skip notification.
        let result = catch_unwind(AssertUnwindSafe(|| loop {
            let dirty = self.inner.batcher.take_dirty();
            if dirty.is_empty() {
                break;
            }
            let snapshot = self.get_state();
            self.inner.subscriptions.deliver(&snapshot, &dirty);
        }));
        self.inner.batcher.end_flush();
        if let Err(payload) = result {
            resume_unwind(payload);
        }
    }

    /// Register a notification callback.
    ///
    /// The callback receives the post-batch state snapshot and the set of
    /// fields that changed during the batch. It fires at most once per batch,
    /// only when the dirty set intersects `targets`.
    pub fn subscribe<F>(&self, targets: Targets, callback: F) -> Subscription
    where
        F: Fn(&StateRecord, &DirtyFields) + Send + Sync + 'static,
    {
        self.inner.subscriptions.add(targets, Arc::new(callback))
    }

    /// Run a named action inside a batch.
    ///
    /// # Panics
    ///
    /// Panics when no action with this name is registered. Use
    /// [`try_dispatch`](Store::try_dispatch) for dynamic invocation.
    pub fn dispatch(&self, action: &str, args: &[Value]) {
        if let Err(err) = self.try_dispatch(action, args) {
            panic!("{err}");
        }
    }

    pub fn try_dispatch(&self, action: &str, args: &[Value]) -> Result<(), StoreError> {
        let f = self
            .inner
            .actions
            .get(action)
            .cloned()
            .ok_or_else(|| StoreError::UnknownAction(action.to_string()))?;
        self.batch(|| f(self, args));
        Ok(())
    }
}
