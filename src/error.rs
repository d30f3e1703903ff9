use thiserror::Error;

use crate::store::Field;
use crate::value::ValueKind;

/// Errors raised while operating on an existing store.
///
/// Both variants are program defects rather than runtime conditions: the key
/// set and the action table of a store are fixed at construction, so hitting
/// either error means a widget is addressing state it never declared. The
/// panicking entry points (`set_state`, `get`, `dispatch`) fail fast with
/// these messages; the `try_` variants return them instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The field is not part of the store's fixed key set.
    #[error("unknown field `{0}`: the key set of a store is fixed at construction")]
    InvalidField(Field),

    /// No action with this name was registered on the store or any of its
    /// constituent parts.
    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

/// Errors surfaced while building a store.
///
/// Construction errors are fatal at setup time and are reported immediately
/// by [`StoreBuilder::build`](crate::StoreBuilder::build) rather than being
/// deferred to the first read or write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// Two constituent stores declare the same field with incompatible value
    /// kinds. `Null` never conflicts; it carries no kind of its own.
    #[error("field `{field}` is declared as {existing} by an earlier store and as {incoming} by a later one")]
    TypeConflict {
        field: Field,
        existing: ValueKind,
        incoming: ValueKind,
    },

    /// A controlled binding names a field outside the composed key set.
    #[error("controlled field `{0}` does not exist in the composed key set")]
    UnknownControlledField(Field),
}
