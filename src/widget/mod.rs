//! Widget store factories.
//!
//! Each widget concern is an independently constructed store: list
//! navigation ([`CompositeStore`]), floating-panel visibility
//! ([`PopoverStore`], [`TooltipStore`]). Compound widgets merge them; a
//! [`ComboboxStore`] is a composite part plus a popover part plus a text
//! value. The typed wrappers only add ergonomic methods over the generic
//! [`Store`](crate::Store) contract, so a rendering collaborator can always
//! fall back to `store()` for subscriptions and dynamic access.
//!
//! Action surfaces shared between widgets are traits with default methods
//! ([`CompositeActions`], [`PopoverActions`]); a compound widget re-exports
//! its constituents' actions by implementing their traits.

mod combobox;
mod composite;
mod popover;
mod tooltip;

pub use combobox::{ComboboxOptions, ComboboxStore};
pub use composite::{CompositeActions, CompositeOptions, CompositeStore};
pub use popover::{PopoverActions, PopoverOptions, PopoverStore};
pub use tooltip::{TooltipOptions, TooltipStore};

use crate::store::{Store, StoreBuilder};
use crate::value::Value;

/// Access to the underlying generic store of a typed widget wrapper.
pub trait WidgetStore {
    fn store(&self) -> &Store;
}

/// Widget schemas are static, so building them cannot hit a composition
/// error; surface one as the program defect it would be.
pub(crate) fn finish(builder: StoreBuilder, widget: &str) -> Store {
    builder
        .build()
        .unwrap_or_else(|err| panic!("{widget} store construction failed: {err}"))
}

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}
