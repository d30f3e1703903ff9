use std::sync::{Arc, Mutex, RwLock};

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;

use crate::error::ComposeError;
use crate::store::batch::Batcher;
use crate::store::controlled::{ControlledProp, ControlledSetter};
use crate::store::state::StateRecord;
use crate::store::store::{ActionFn, Owner, Route, Store, StoreInner};
use crate::store::subscribe::{SubscriptionManager, Targets};
use crate::store::Field;
use crate::value::{Value, ValueKind};

/// Builds a store out of constituent parts, extra fields, actions and
/// controlled bindings.
///
/// The built store's key set is the union of the parts' keys (in argument
/// order) plus the builder's own fields; later parts and own fields override
/// earlier definitions of the same name, and the same rule applies to
/// actions. Every override is logged at debug level, since silent shadowing
/// is a latent bug source; an override with an incompatible value kind is a
/// construction error instead.
///
/// Parts passed in are shared, not consumed: a constituent keeps working as a
/// store of its own, and mutations through either surface notify both. The
/// composed store holds one forwarding bridge per part so that a compound
/// action spanning several parts still produces exactly one notification
/// through the composed subscribers. The bridges are removed when the
/// composed store is dropped.
#[derive(Default)]
pub struct StoreBuilder {
    parts: Vec<Store>,
    state: StateRecord,
    actions: IndexMap<&'static str, ActionFn>,
    controlled: Vec<ControlledProp>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constituent store. Later parts override earlier ones.
    pub fn part(mut self, store: Store) -> Self {
        self.parts.push(store);
        self
    }

    /// Declare an own field. Own fields override part fields of the same
    /// name.
    pub fn field(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.state.insert(field, value.into());
        self
    }

    /// Register a named action.
    pub fn action<F>(mut self, name: &'static str, action: F) -> Self
    where
        F: Fn(&Store, &[Value]) + Send + Sync + 'static,
    {
        self.actions.insert(name, Arc::new(action));
        self
    }

    /// Declare a controlled binding for a field of the built store.
    pub fn controlled(mut self, prop: ControlledProp) -> Self {
        self.controlled.push(prop);
        self
    }

    pub fn build(self) -> Result<Store, ComposeError> {
        let mut routes: IndexMap<Field, Route> = IndexMap::new();
        let mut kinds: IndexMap<Field, ValueKind> = IndexMap::new();

        for (i, part) in self.parts.iter().enumerate() {
            for field in part.fields() {
                merge_kind(&mut kinds, field, part.get(field).kind())?;
                match routes.entry(field) {
                    Entry::Occupied(mut entry) => {
                        debug!(
                            "field `{field}` from store part {i} shadows an earlier definition; \
                             last writer wins"
                        );
                        let route = entry.get_mut();
                        route.writers.push(Owner::Part(i));
                        route.reader = Owner::Part(i);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(Route {
                            reader: Owner::Part(i),
                            writers: vec![Owner::Part(i)],
                        });
                    }
                }
            }
        }
        for (field, value) in self.state.iter() {
            merge_kind(&mut kinds, field, value.kind())?;
            match routes.entry(field) {
                Entry::Occupied(mut entry) => {
                    debug!("own field `{field}` shadows a store part's definition; last writer wins");
                    let route = entry.get_mut();
                    route.writers.push(Owner::Local);
                    route.reader = Owner::Local;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Route::local());
                }
            }
        }

        let mut actions: IndexMap<&'static str, ActionFn> = IndexMap::new();
        for (i, part) in self.parts.iter().enumerate() {
            for (name, action) in &part.inner.actions {
                if actions.insert(name, Arc::clone(action)).is_some() {
                    debug!("action `{name}` from store part {i} overrides an earlier registration");
                }
            }
        }
        for (name, action) in self.actions {
            if actions.insert(name, action).is_some() {
                debug!("own action `{name}` overrides a store part's registration");
            }
        }

        let mut controlled: IndexMap<Field, ControlledProp> = IndexMap::new();
        for prop in self.controlled {
            if !routes.contains_key(prop.field()) {
                return Err(ComposeError::UnknownControlledField(prop.field()));
            }
            // A binding with neither callback is plain internal state.
            if !prop.is_inert() {
                controlled.insert(prop.field(), prop);
            }
        }
        let setters: Vec<(Field, ControlledSetter)> = controlled
            .values()
            .filter_map(|prop| prop.setter_fn().map(|setter| (prop.field(), setter)))
            .collect();

        let inner = Arc::new(StoreInner {
            parts: self.parts,
            local: RwLock::new(self.state),
            routes,
            actions,
            controlled,
            subscriptions: Arc::new(SubscriptionManager::new()),
            batcher: Batcher::new(),
            wiring: Mutex::new(Vec::new()),
        });
        let store = Store::from_inner(Arc::clone(&inner));

        // Bridge each part's notifications into this store's batch. The
        // bridges hold a weak reference so a part never keeps a dropped
        // composed store alive.
        let mut wiring = Vec::new();
        for part in &inner.parts {
            let weak = Arc::downgrade(&inner);
            wiring.push(part.subscribe(Targets::All, move |_, dirty| {
                if let Some(inner) = weak.upgrade() {
                    Store::from_inner(inner).mark_dirty(dirty.iter().copied());
                }
            }));
        }

        // Controlled setters fire once per batch with the new internal value
        // of their field; read-through is skipped on purpose so the host sees
        // the value the action attempted, not its own current value.
        for (field, setter) in setters {
            let weak = Arc::downgrade(&inner);
            wiring.push(store.subscribe(Targets::fields([field]), move |_, _| {
                if let Some(inner) = weak.upgrade() {
                    if let Some(value) = Store::from_inner(inner).raw_get(field) {
                        setter(&value);
                    }
                }
            }));
        }
        *inner.wiring.lock().unwrap() = wiring;

        Ok(store)
    }
}

/// Merge two independently constructed stores (and more) into one.
///
/// Equivalent to feeding each store to [`StoreBuilder::part`] in order and
/// building. See [`StoreBuilder`] for the override and bridging rules.
pub fn compose_stores<I>(parts: I) -> Result<Store, ComposeError>
where
    I: IntoIterator<Item = Store>,
{
    parts
        .into_iter()
        .fold(Store::builder(), StoreBuilder::part)
        .build()
}

fn merge_kind(
    kinds: &mut IndexMap<Field, ValueKind>,
    field: Field,
    incoming: ValueKind,
) -> Result<(), ComposeError> {
    match kinds.entry(field) {
        Entry::Vacant(entry) => {
            entry.insert(incoming);
            Ok(())
        }
        Entry::Occupied(mut entry) => {
            let existing = *entry.get();
            // Null carries no kind of its own and never conflicts.
            if existing == ValueKind::Null {
                entry.insert(incoming);
                Ok(())
            } else if incoming == ValueKind::Null || incoming == existing {
                Ok(())
            } else {
                Err(ComposeError::TypeConflict {
                    field,
                    existing,
                    incoming,
                })
            }
        }
    }
}
