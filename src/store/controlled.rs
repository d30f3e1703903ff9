use std::sync::Arc;

use crate::store::Field;
use crate::value::Value;

pub(crate) type ControlledGetter = Arc<dyn Fn() -> Option<Value> + Send + Sync>;
pub(crate) type ControlledSetter = Arc<dyn Fn(&Value) + Send + Sync>;

/// Declares a field whose value may be owned by the host application.
///
/// The getter is consulted on every read exposed to consumers: while it
/// returns `Some`, that value is authoritative and the internal field only
/// serves as the uncontrolled fallback. When an action mutates a controlled
/// field, the internal record is still updated and the setter, if present, is
/// invoked once per batch with the new internal value.
///
/// The contract is cooperative: a fully controlled host is expected to feed
/// the value back through its getter after a setter call. The store does not
/// force it, so a host that ignores setter calls will observe its own stale
/// value on reads. That divergence is documented caller responsibility, not a
/// checked invariant.
///
/// A binding with neither getter nor setter leaves the field as plain
/// internal state and is dropped at construction time.
#[derive(Clone)]
pub struct ControlledProp {
    field: Field,
    get: Option<ControlledGetter>,
    set: Option<ControlledSetter>,
}

impl ControlledProp {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            get: None,
            set: None,
        }
    }

    /// Attach the external value source. Returning `None` means
    /// "uncontrolled right now"; the internal fallback is used.
    pub fn getter<F>(mut self, get: F) -> Self
    where
        F: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        self.get = Some(Arc::new(get));
        self
    }

    /// Attach the external setter, invoked when an action mutates the field.
    pub fn setter<F>(mut self, set: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.set = Some(Arc::new(set));
        self
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub(crate) fn external_value(&self) -> Option<Value> {
        self.get.as_ref().and_then(|get| get())
    }

    pub(crate) fn setter_fn(&self) -> Option<ControlledSetter> {
        self.set.clone()
    }

    pub(crate) fn is_inert(&self) -> bool {
        self.get.is_none() && self.set.is_none()
    }
}
