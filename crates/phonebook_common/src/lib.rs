//! Shared building blocks of the phonebook: the SQLite contact store, the
//! search/filter engine and the editor field validators.
//!
//! The terminal front end lives in the `phonebook` crate; nothing in here
//! touches the terminal.

pub mod model;
pub mod search;
pub mod store;
pub mod validate;

pub use model::{
    ContactRow, NewPerson, NewPhone, Person, PersonPatch, Phone, PhonePatch, SearchFilter,
};
pub use store::{ContactStore, StoreError, StoreResult};
pub use validate::{FieldError, FieldKind, FieldValue};
