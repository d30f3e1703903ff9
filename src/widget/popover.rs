use std::any::Any;
use std::sync::Arc;

use crate::store::{ControlledProp, Store};
use crate::value::Value;
use crate::widget::{arg, finish, WidgetStore};

/// Options for [`PopoverStore::new`].
pub struct PopoverOptions {
    pub default_open: bool,
    /// Requested placement relative to the anchor, e.g. `"bottom-start"`.
    /// The store only holds the string; geometry is computed by the
    /// positioning collaborator.
    pub placement: String,
    /// Controlled bindings, usually for `open`.
    pub controlled: Vec<ControlledProp>,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self {
            default_open: false,
            placement: "bottom".to_string(),
            controlled: Vec::new(),
        }
    }
}

/// Floating-panel state: visibility, the anchor it floats against and the
/// requested placement.
///
/// Fields: `open: Bool`, `anchor: Null | Handle`, `placement: Str`.
pub struct PopoverStore {
    store: Store,
}

impl PopoverStore {
    pub fn new(options: PopoverOptions) -> Self {
        let mut builder = Store::builder()
            .field("open", options.default_open)
            .field("anchor", Value::Null)
            .field("placement", options.placement)
            .action("show", |store, _| {
                store.set_state([("open", Value::from(true))]);
            })
            .action("hide", |store, _| {
                store.set_state([("open", Value::from(false))]);
            })
            .action("toggle", |store, _| {
                let open = store.get("open").as_bool().unwrap_or(false);
                store.set_state([("open", Value::from(!open))]);
            })
            .action("set_open", |store, args| {
                store.set_state([("open", arg(args, 0))]);
            })
            .action("set_anchor", |store, args| {
                store.set_state([("anchor", arg(args, 0))]);
            })
            .action("set_placement", |store, args| {
                store.set_state([("placement", arg(args, 0))]);
            });
        for prop in options.controlled {
            builder = builder.controlled(prop);
        }
        Self {
            store: finish(builder, "popover"),
        }
    }

    pub fn into_store(self) -> Store {
        self.store
    }
}

impl WidgetStore for PopoverStore {
    fn store(&self) -> &Store {
        &self.store
    }
}

impl PopoverActions for PopoverStore {}

/// Floating-panel actions, re-exported by every widget carrying a popover
/// part.
pub trait PopoverActions: WidgetStore {
    fn show(&self) {
        self.store().dispatch("show", &[]);
    }

    fn hide(&self) {
        self.store().dispatch("hide", &[]);
    }

    fn toggle(&self) {
        self.store().dispatch("toggle", &[]);
    }

    fn set_open(&self, open: bool) {
        self.store().dispatch("set_open", &[Value::from(open)]);
    }

    /// Point the panel at a host-owned anchor object. The store treats the
    /// anchor as opaque; the positioning collaborator downcasts it.
    fn set_anchor(&self, anchor: Option<Arc<dyn Any + Send + Sync>>) {
        let value = match anchor {
            Some(handle) => Value::Handle(handle),
            None => Value::Null,
        };
        self.store().dispatch("set_anchor", &[value]);
    }

    fn set_placement(&self, placement: &str) {
        self.store()
            .dispatch("set_placement", &[Value::from(placement)]);
    }

    fn open(&self) -> bool {
        self.store().get("open").as_bool().unwrap_or(false)
    }

    fn placement(&self) -> String {
        self.store()
            .get("placement")
            .as_str()
            .unwrap_or_default()
            .to_owned()
    }

    fn anchor(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        match self.store().get("anchor") {
            Value::Handle(handle) => Some(handle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Targets;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn show_hide_toggle() {
        let popover = PopoverStore::new(PopoverOptions::default());
        assert!(!popover.open());
        popover.show();
        assert!(popover.open());
        popover.toggle();
        assert!(!popover.open());
        popover.set_open(true);
        assert!(popover.open());
        popover.hide();
        assert!(!popover.open());
    }

    #[test]
    fn show_notifies_once_with_the_open_field_dirty() {
        let popover = PopoverStore::new(PopoverOptions::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let _sub = popover
            .store()
            .subscribe(Targets::fields(["open"]), move |_, _| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            });

        popover.show();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Showing an open popover changes nothing.
        popover.show();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn anchor_round_trips_as_an_opaque_handle() {
        let popover = PopoverStore::new(PopoverOptions::default());
        assert!(popover.anchor().is_none());

        popover.set_anchor(Some(Arc::new("trigger-node".to_string())));
        let anchor = popover.anchor().and_then(|handle| {
            handle.downcast_ref::<String>().cloned()
        });
        assert_eq!(anchor.as_deref(), Some("trigger-node"));

        popover.set_anchor(None);
        assert!(popover.anchor().is_none());
    }

    #[test]
    fn placement_defaults_to_bottom() {
        let popover = PopoverStore::new(PopoverOptions::default());
        assert_eq!(popover.placement(), "bottom");
        popover.set_placement("top-start");
        assert_eq!(popover.placement(), "top-start");
    }
}
