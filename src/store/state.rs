use indexmap::IndexMap;

use crate::store::Field;
use crate::value::Value;

/// A flat, insertion-ordered mapping from field name to value.
///
/// The key set of a store's record is fixed once the store is built; records
/// handed out by [`Store::get_state`](crate::Store::get_state) are snapshots
/// and mutating a snapshot has no effect on the store.
#[derive(Clone, Debug, Default)]
pub struct StateRecord {
    fields: IndexMap<Field, Value>,
}

impl StateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Builder-style insertion, used when declaring a store's initial state.
    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn insert(&mut self, field: Field, value: Value) {
        self.fields.insert(field, value);
    }
}
