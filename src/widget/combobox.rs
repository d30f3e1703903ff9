use crate::store::{ControlledProp, Store};
use crate::value::Value;
use crate::widget::{
    arg, finish, CompositeActions, CompositeOptions, CompositeStore, PopoverActions,
    PopoverOptions, PopoverStore, WidgetStore,
};

/// Options for [`ComboboxStore::new`].
pub struct ComboboxOptions {
    /// Suggestion item ids, in visual order.
    pub items: Vec<String>,
    /// Initial input value, and the value `reset_value` restores.
    pub default_value: String,
    /// Comboboxes wrap item navigation by default.
    pub focus_loop: bool,
    pub default_open: bool,
    pub placement: String,
    /// Controlled bindings; `value`, `open` and `active_id` are the
    /// controllable fields.
    pub controlled: Vec<ControlledProp>,
}

impl Default for ComboboxOptions {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            default_value: String::new(),
            focus_loop: true,
            default_open: false,
            placement: "bottom".to_string(),
            controlled: Vec::new(),
        }
    }
}

/// Compound combobox state: a composite part for item navigation, a popover
/// part for the suggestion panel, and the text `value` tying them together.
///
/// Both parts' actions are re-exported here, so one store handle drives the
/// whole widget.
pub struct ComboboxStore {
    store: Store,
}

impl ComboboxStore {
    pub fn new(options: ComboboxOptions) -> Self {
        let composite = CompositeStore::new(CompositeOptions {
            items: options.items,
            focus_loop: options.focus_loop,
            ..Default::default()
        });
        let popover = PopoverStore::new(PopoverOptions {
            default_open: options.default_open,
            placement: options.placement,
            ..Default::default()
        });

        let default_value = options.default_value.clone();
        let mut builder = Store::builder()
            .part(composite.into_store())
            .part(popover.into_store())
            .field("value", options.default_value)
            .action("set_value", |store, args| {
                store.set_state([("value", arg(args, 0))]);
            })
            .action("reset_value", move |store, _| {
                store.set_state([("value", Value::from(default_value.as_str()))]);
            });
        for prop in options.controlled {
            builder = builder.controlled(prop);
        }
        Self {
            store: finish(builder, "combobox"),
        }
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    pub fn set_value(&self, value: &str) {
        self.store.dispatch("set_value", &[Value::from(value)]);
    }

    /// Restore the construction-time default value.
    pub fn reset_value(&self) {
        self.store.dispatch("reset_value", &[]);
    }

    pub fn value(&self) -> String {
        self.store
            .get("value")
            .as_str()
            .unwrap_or_default()
            .to_owned()
    }
}

impl WidgetStore for ComboboxStore {
    fn store(&self) -> &Store {
        &self.store
    }
}

impl CompositeActions for ComboboxStore {}
impl PopoverActions for ComboboxStore {}
