//! Integration tests for Cairn

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use cairn::{
    compose_stores, ComboboxOptions, ComboboxStore, CompositeActions, CompositeOptions,
    CompositeStore, ControlledProp, DirtyFields, PopoverActions, PopoverOptions, PopoverStore,
    StateRecord, Store, Targets, Value, WidgetStore,
};

fn count_calls(store: &Store) -> (Arc<AtomicUsize>, Arc<Mutex<DirtyFields>>, cairn::Subscription) {
    let calls = Arc::new(AtomicUsize::new(0));
    let dirty = Arc::new(Mutex::new(DirtyFields::new()));
    let calls_clone = Arc::clone(&calls);
    let dirty_clone = Arc::clone(&dirty);
    let sub = store.subscribe(Targets::All, move |_, d| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        *dirty_clone.lock().unwrap() = d.clone();
    });
    (calls, dirty, sub)
}

#[test]
fn one_notification_per_batch_with_the_dirty_union() {
    let store = Store::new(
        StateRecord::new()
            .with("a", 0i64)
            .with("b", 0i64)
            .with("c", 0i64),
    );
    let (calls, dirty, _sub) = count_calls(&store);

    store.batch(|| {
        store.set_state([("a", Value::from(1i64))]);
        store.set_state([("b", Value::from(2i64))]);
        store.set_state([("a", Value::from(3i64))]);
        // c is written but does not change.
        store.set_state([("c", Value::from(0i64))]);
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let dirty: Vec<_> = dirty.lock().unwrap().iter().copied().collect();
    assert_eq!(dirty, vec!["a", "b"]);
}

#[test]
fn setting_an_unchanged_value_is_idempotent() {
    let store = Store::new(StateRecord::new().with("value", "x"));
    let (calls, _, _sub) = count_calls(&store);

    store.set_state([("value", Value::from("y"))]);
    store.set_state([("value", Value::from("y"))]);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn composition_associativity() {
    let composite = || CompositeStore::new(CompositeOptions::default()).into_store();
    let popover = || PopoverStore::new(PopoverOptions::default()).into_store();
    let extra = || Store::new(StateRecord::new().with("label", "x"));

    let nested = compose_stores([
        compose_stores([composite(), popover()]).unwrap(),
        extra(),
    ])
    .unwrap();
    let flat = compose_stores([composite(), popover(), extra()]).unwrap();

    assert_eq!(nested.fields(), flat.fields());
    assert_eq!(nested.actions(), flat.actions());

    // Writes still route through the nesting.
    nested.dispatch("show", &[]);
    assert_eq!(nested.get("open").as_bool(), Some(true));
}

#[test]
fn controlled_field_read_through() {
    let store = Store::builder()
        .field("value", "fallback")
        .controlled(ControlledProp::new("value").getter(|| Some(Value::from("external"))))
        .build()
        .unwrap();

    store.set_state([("value", Value::from("internal"))]);

    assert_eq!(store.get("value").as_str(), Some("external"));
    assert_eq!(
        store.get_state().get("value").and_then(Value::as_str),
        Some("external")
    );
}

// Scenario: list navigation over ["a", "b", "c"]. The documented boundary
// policy is clamp: without focus_loop, next() on the last item is a no-op.
#[test]
fn list_navigation_scenario() {
    let list = CompositeStore::new(CompositeOptions {
        items: vec!["a".into(), "b".into(), "c".into()],
        ..Default::default()
    });
    assert_eq!(list.active_id(), None);

    list.next();
    assert_eq!(list.active_id(), Some("a".into()));

    list.next();
    list.next();
    assert_eq!(list.active_id(), Some("c".into()));

    list.next();
    assert_eq!(list.active_id(), Some("c".into()));
}

// Scenario: compose a panel store with an extra label field; the panel's own
// show() action reaches composed subscribers exactly once.
#[test]
fn composed_panel_scenario() {
    let panel = PopoverStore::new(PopoverOptions::default());
    let composed = Store::builder()
        .part(panel.store().clone())
        .field("label", "x")
        .build()
        .unwrap();
    let (calls, dirty, _sub) = count_calls(&composed);

    panel.show();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let dirty: Vec<_> = dirty.lock().unwrap().iter().copied().collect();
    assert_eq!(dirty, vec!["open"]);
    assert_eq!(composed.get("label").as_str(), Some("x"));
    assert_eq!(composed.get("open").as_bool(), Some(true));
}

// Scenario: a fully controlled value field. The host's getter stays
// authoritative after the action; the setter records the attempted value.
// The contract is cooperative: nothing forces the host to accept it.
#[test]
fn controlled_value_scenario() {
    let external = Arc::new(Mutex::new(Some(Value::from("hello"))));
    let setter_calls = Arc::new(Mutex::new(Vec::new()));

    let external_clone = Arc::clone(&external);
    let setter_calls_clone = Arc::clone(&setter_calls);
    let store = Store::builder()
        .field("value", "hello")
        .action("set_value", |store, args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            store.set_state([("value", value)]);
        })
        .controlled(
            ControlledProp::new("value")
                .getter(move || external_clone.lock().unwrap().clone())
                .setter(move |value| {
                    setter_calls_clone
                        .lock()
                        .unwrap()
                        .push(value.as_str().map(str::to_owned));
                }),
        )
        .build()
        .unwrap();

    store.dispatch("set_value", &[Value::from("world")]);

    // The setter saw the attempted value exactly once...
    assert_eq!(*setter_calls.lock().unwrap(), vec![Some("world".to_owned())]);
    // ...but reads still follow the external getter.
    assert_eq!(store.get("value").as_str(), Some("hello"));

    // Once the host stops controlling the field, the internal record shows
    // the mutation was applied all along.
    *external.lock().unwrap() = None;
    assert_eq!(store.get("value").as_str(), Some("world"));
}

// Scenario: two independent stores composed together, both mutated inside
// one externally provided batch: one combined notification, not two.
#[test]
fn cross_store_batch_scenario() {
    let left = PopoverStore::new(PopoverOptions::default());
    let right = PopoverStore::new(PopoverOptions {
        placement: "top".to_string(),
        ..Default::default()
    });

    let composed = compose_stores([left.store().clone(), right.store().clone()]).unwrap();
    let (calls, dirty, _sub) = count_calls(&composed);

    composed.batch(|| {
        left.show();
        right.show();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(dirty.lock().unwrap().contains("open"));
    assert!(left.open());
    assert!(right.open());
}

#[test]
fn combobox_drives_all_constituents() {
    let combobox = ComboboxStore::new(ComboboxOptions {
        items: vec!["apple".into(), "banana".into()],
        ..Default::default()
    });
    let (calls, _, _sub) = count_calls(combobox.store());

    combobox.store().batch(|| {
        combobox.show();
        combobox.set_value("ba");
        combobox.next();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(combobox.open());
    assert_eq!(combobox.value(), "ba");
    assert_eq!(combobox.active_id(), Some("apple".into()));
}

#[test]
fn subscribers_are_notified_in_registration_order() {
    let store = Store::new(StateRecord::new().with("n", 0i64));
    let order = Arc::new(Mutex::new(Vec::new()));

    let subs: Vec<_> = (0..4)
        .map(|i| {
            let order = Arc::clone(&order);
            store.subscribe(Targets::All, move |_, _| order.lock().unwrap().push(i))
        })
        .collect();

    store.set_state([("n", Value::from(1i64))]);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    drop(subs);
}

#[test]
fn constituent_stores_remain_usable_on_their_own() {
    let panel = PopoverStore::new(PopoverOptions::default());
    let composed = Store::builder()
        .part(panel.store().clone())
        .field("label", "x")
        .build()
        .unwrap();

    // Dropping the composed view must not tear down the borrowed part.
    drop(composed);
    panel.show();
    assert!(panel.open());
}

#[test]
fn a_panicking_subscriber_does_not_mute_later_batches() {
    use std::sync::atomic::AtomicBool;

    let store = Store::new(StateRecord::new().with("n", 0i64));
    let armed = Arc::new(AtomicBool::new(true));
    let armed_clone = Arc::clone(&armed);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let _sub = store.subscribe(Targets::All, move |_, _| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        if armed_clone.load(Ordering::SeqCst) {
            panic!("subscriber failure");
        }
    });

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        store.set_state([("n", Value::from(1i64))]);
    }));
    assert!(result.is_err());

    // The failed delivery must not wedge the flush machinery.
    armed.store(false, Ordering::SeqCst);
    store.set_state([("n", Value::from(2i64))]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.get("n").as_int(), Some(2));
}
