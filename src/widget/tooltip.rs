use crate::store::{ControlledProp, Store};
use crate::value::Value;
use crate::widget::{arg, finish, PopoverActions, PopoverOptions, PopoverStore, WidgetStore};

/// Options for [`TooltipStore::new`].
pub struct TooltipOptions {
    pub popover: PopoverOptions,
    /// Milliseconds the host should wait before showing. The store only
    /// carries the number; the host owns the timer.
    pub show_timeout: i64,
    /// Milliseconds the host should wait before hiding.
    pub hide_timeout: i64,
    pub controlled: Vec<ControlledProp>,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            popover: PopoverOptions::default(),
            show_timeout: 500,
            hide_timeout: 0,
            controlled: Vec::new(),
        }
    }
}

/// Tooltip state: a popover part plus the host-facing timing hints.
pub struct TooltipStore {
    store: Store,
}

impl TooltipStore {
    pub fn new(options: TooltipOptions) -> Self {
        let popover = PopoverStore::new(options.popover);
        let mut builder = Store::builder()
            .part(popover.into_store())
            .field("show_timeout", options.show_timeout)
            .field("hide_timeout", options.hide_timeout)
            .action("set_show_timeout", |store, args| {
                store.set_state([("show_timeout", arg(args, 0))]);
            })
            .action("set_hide_timeout", |store, args| {
                store.set_state([("hide_timeout", arg(args, 0))]);
            });
        for prop in options.controlled {
            builder = builder.controlled(prop);
        }
        Self {
            store: finish(builder, "tooltip"),
        }
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    pub fn set_show_timeout(&self, ms: i64) {
        self.store.dispatch("set_show_timeout", &[Value::from(ms)]);
    }

    pub fn set_hide_timeout(&self, ms: i64) {
        self.store.dispatch("set_hide_timeout", &[Value::from(ms)]);
    }

    pub fn show_timeout(&self) -> i64 {
        self.store.get("show_timeout").as_int().unwrap_or(0)
    }

    pub fn hide_timeout(&self) -> i64 {
        self.store.get("hide_timeout").as_int().unwrap_or(0)
    }
}

impl WidgetStore for TooltipStore {
    fn store(&self) -> &Store {
        &self.store
    }
}

impl PopoverActions for TooltipStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_popover_actions() {
        let tooltip = TooltipStore::new(TooltipOptions::default());
        assert!(!tooltip.open());
        tooltip.show();
        assert!(tooltip.open());
    }

    #[test]
    fn carries_timing_hints_without_owning_timers() {
        let tooltip = TooltipStore::new(TooltipOptions::default());
        assert_eq!(tooltip.show_timeout(), 500);
        assert_eq!(tooltip.hide_timeout(), 0);
        tooltip.set_show_timeout(200);
        assert_eq!(tooltip.show_timeout(), 200);
    }
}
