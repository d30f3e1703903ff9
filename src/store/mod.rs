//! The composable reactive store core.
//!
//! A [`Store`] holds a flat state record with a key set fixed at
//! construction, notifies subscribers about the fields that actually changed,
//! and batches the mutations of one unit of work into a single notification
//! pass. Stores built independently can be merged with a [`StoreBuilder`] or
//! [`compose_stores`] into one store whose state and action set are the union
//! of the constituents', and any field can be bound to a host-owned value
//! through a [`ControlledProp`].

mod batch;
mod compose;
mod controlled;
mod state;
mod store;
mod subscribe;

pub use compose::{compose_stores, StoreBuilder};
pub use controlled::ControlledProp;
pub use state::StateRecord;
pub use store::{ActionFn, DirtyFields, Field, Store};
pub use subscribe::{Subscription, Targets};
