use crate::store::{ControlledProp, Store};
use crate::value::Value;
use crate::widget::{arg, finish, WidgetStore};

/// Options for [`CompositeStore::new`].
#[derive(Default)]
pub struct CompositeOptions {
    /// Item ids, in visual order.
    pub items: Vec<String>,
    /// The id highlighted before any navigation. `None` means no item is
    /// active yet; `next` moves to the first item and `previous` to the last.
    pub default_active_id: Option<String>,
    /// Whether `next` on the last item (and `previous` on the first) wraps
    /// around. With `false`, the boundary move is a no-op.
    pub focus_loop: bool,
    /// Controlled bindings, usually for `active_id`.
    pub controlled: Vec<ControlledProp>,
}

/// Keyboard-navigable list state: which items exist and which one is active.
///
/// Fields: `items: List[Str]`, `active_id: Null | Str`, `focus_loop: Bool`.
pub struct CompositeStore {
    store: Store,
}

impl CompositeStore {
    pub fn new(options: CompositeOptions) -> Self {
        let items: Vec<Value> = options
            .items
            .iter()
            .map(|id| Value::from(id.as_str()))
            .collect();
        let mut builder = Store::builder()
            .field("items", items)
            .field("active_id", Value::from(options.default_active_id))
            .field("focus_loop", options.focus_loop)
            .action("next", |store, _| step_active(store, Step::Next))
            .action("previous", |store, _| step_active(store, Step::Previous))
            .action("first", |store, _| step_active(store, Step::First))
            .action("last", |store, _| step_active(store, Step::Last))
            .action("set_active_id", |store, args| {
                store.set_state([("active_id", arg(args, 0))]);
            })
            .action("set_items", |store, args| {
                store.set_state([("items", arg(args, 0))]);
            });
        for prop in options.controlled {
            builder = builder.controlled(prop);
        }
        Self {
            store: finish(builder, "composite"),
        }
    }

    pub fn into_store(self) -> Store {
        self.store
    }
}

impl WidgetStore for CompositeStore {
    fn store(&self) -> &Store {
        &self.store
    }
}

impl CompositeActions for CompositeStore {}

/// List-navigation actions, re-exported by every widget carrying a composite
/// part.
pub trait CompositeActions: WidgetStore {
    /// Move to the item after the active one; see
    /// [`CompositeOptions::focus_loop`] for the boundary policy.
    fn next(&self) {
        self.store().dispatch("next", &[]);
    }

    fn previous(&self) {
        self.store().dispatch("previous", &[]);
    }

    fn first(&self) {
        self.store().dispatch("first", &[]);
    }

    fn last(&self) {
        self.store().dispatch("last", &[]);
    }

    fn set_active_id(&self, id: Option<&str>) {
        self.store()
            .dispatch("set_active_id", &[id.map_or(Value::Null, Value::from)]);
    }

    /// Replace the item list. Always a change (lists compare by identity),
    /// and the active id is left alone even when it no longer matches an
    /// item; navigation treats a stale id like no active item.
    fn set_items(&self, items: &[&str]) {
        let items: Vec<Value> = items.iter().copied().map(Value::from).collect();
        self.store().dispatch("set_items", &[Value::from(items)]);
    }

    fn active_id(&self) -> Option<String> {
        self.store().get("active_id").as_str().map(str::to_owned)
    }

    fn items(&self) -> Vec<String> {
        self.store()
            .get("items")
            .as_list()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy)]
enum Step {
    Next,
    Previous,
    First,
    Last,
}

fn step_active(store: &Store, step: Step) {
    let items = store.get("items");
    let ids: Vec<&str> = items
        .as_list()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if ids.is_empty() {
        return;
    }
    let last = ids.len() - 1;
    let focus_loop = store.get("focus_loop").as_bool().unwrap_or(false);
    let active = store.get("active_id");
    let index = active.as_str().and_then(|id| ids.iter().position(|i| *i == id));

    let target = match (step, index) {
        (Step::First, _) => Some(0),
        (Step::Last, _) => Some(last),
        (Step::Next, None) => Some(0),
        (Step::Next, Some(i)) if i < last => Some(i + 1),
        (Step::Next, Some(_)) => focus_loop.then_some(0),
        (Step::Previous, None) => Some(last),
        (Step::Previous, Some(0)) => focus_loop.then_some(last),
        (Step::Previous, Some(i)) => Some(i - 1),
    };
    if let Some(i) = target {
        store.set_state([("active_id", Value::from(ids[i]))]);
    }
}
