//! Combobox walkthrough: one composed store driving list navigation, the
//! suggestion panel and the text value.

use cairn::{
    ComboboxOptions, ComboboxStore, CompositeActions, PopoverActions, Targets, Value, WidgetStore,
};

fn main() {
    env_logger::init();

    println!("=== Combobox ===\n");

    let combobox = ComboboxStore::new(ComboboxOptions {
        items: vec!["Apple".into(), "Banana".into(), "Orange".into()],
        ..Default::default()
    });

    // A rendering collaborator would patch the tree here; we just log what
    // changed and what the widget looks like afterwards.
    let _sub = combobox.store().subscribe(Targets::All, |state, dirty| {
        let dirty: Vec<_> = dirty.iter().copied().collect();
        println!(
            "changed {:?} -> open: {:?}, active: {:?}, value: {:?}",
            dirty,
            state.get("open").and_then(Value::as_bool),
            state.get("active_id").and_then(Value::as_str),
            state.get("value").and_then(Value::as_str),
        );
    });

    println!("User focuses the input and presses ArrowDown...");
    combobox.store().batch(|| {
        combobox.show();
        combobox.next();
    });

    println!("\nUser keeps navigating...");
    combobox.next();
    combobox.next();

    println!("\nUser types...");
    combobox.set_value("Ban");

    println!("\nUser picks the active item and the panel closes...");
    let picked = combobox.active_id();
    combobox.store().batch(|| {
        if let Some(id) = picked.as_deref() {
            combobox.set_value(id);
        }
        combobox.hide();
    });

    println!("\nFinal value: {:?}", combobox.value());
}
