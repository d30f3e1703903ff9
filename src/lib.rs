//! # Cairn
//!
//! Composable reactive state stores for accessible UI widgets.
//!
//! Cairn is the shared state layer under a family of widgets (combobox,
//! popover, tooltip, composite lists). Each widget concern is an independent
//! store; compound widgets stack them into one:
//!
//! ## Store (the core)
//!
//! - [`Store`] - Fixed-schema state container with field-scoped change
//!   notifications and batched delivery
//! - [`StoreBuilder`] / [`compose_stores`] - Merge independent stores into
//!   one store exposing the union of their state and actions
//! - [`ControlledProp`] - Bind a field to a value owned by the host
//!   application
//!
//! ## Widgets (the factories)
//!
//! - [`CompositeStore`] - Keyboard-navigable list state
//! - [`PopoverStore`] / [`TooltipStore`] - Floating-panel state
//! - [`ComboboxStore`] - Composite + popover + a text value
//!
//! Everything is synchronous and single-threaded in spirit: actions and
//! notifications run to completion on the calling thread of control.
//! Rendering, accessibility wiring and floating-element geometry are external
//! collaborators that consume the store contract.

pub mod error;
pub mod store;
pub mod value;
pub mod widget;

// Re-export main types for convenience
pub use error::{ComposeError, StoreError};
pub use store::{
    compose_stores, ControlledProp, DirtyFields, Field, StateRecord, Store, StoreBuilder,
    Subscription, Targets,
};
pub use value::{Value, ValueKind};
pub use widget::{
    ComboboxOptions, ComboboxStore, CompositeActions, CompositeOptions, CompositeStore,
    PopoverActions, PopoverOptions, PopoverStore, TooltipOptions, TooltipStore, WidgetStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::new(StateRecord::new().with("open", false));
        assert_eq!(store.get("open").as_bool(), Some(false));
        store.set_state([("open", Value::from(true))]);
        assert_eq!(store.get("open").as_bool(), Some(true));
    }
}
