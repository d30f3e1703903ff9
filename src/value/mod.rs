//! Dynamically typed field values.
//!
//! Widget state records map field names to [`Value`]s so that stores with
//! unrelated shapes can be composed into one record at runtime. The equality
//! policy lives here too: primitives compare by value, aggregates and opaque
//! handles by identity.

mod value;

pub use value::{Value, ValueKind};
