//! Controlled-field walkthrough: the host application owns the combobox
//! value; the store reports attempted changes through the setter and mirrors
//! whatever the host currently supplies.

use std::sync::{Arc, Mutex};

use cairn::{ComboboxOptions, ComboboxStore, ControlledProp, Value};

fn main() {
    env_logger::init();

    println!("=== Controlled value ===\n");

    // The host's source of truth, e.g. a field in its own model.
    let host_value = Arc::new(Mutex::new(Some(Value::from("initial"))));

    let getter_cell = Arc::clone(&host_value);
    let setter_cell = Arc::clone(&host_value);
    let combobox = ComboboxStore::new(ComboboxOptions {
        items: vec!["initial".into(), "updated".into()],
        controlled: vec![ControlledProp::new("value")
            .getter(move || getter_cell.lock().unwrap().clone())
            // A cooperative host: it accepts every attempted change. A host
            // that ignores this call keeps its own value on all reads.
            .setter(move |value| {
                println!("host asked to adopt {:?}", value.as_str());
                *setter_cell.lock().unwrap() = Some(value.clone());
            })],
        ..Default::default()
    });

    println!("store reads: {:?}", combobox.value());

    println!("\nWidget tries to set the value...");
    combobox.set_value("updated");
    println!("store reads: {:?}", combobox.value());

    println!("\nHost overrides from the outside...");
    *host_value.lock().unwrap() = Some(Value::from("host-forced"));
    println!("store reads: {:?}", combobox.value());
}
