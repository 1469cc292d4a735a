//! `recmatch-table`: ordered rows of named fields with optional primary-key identity.
//!
//! Foundation crate: no IO, no matching. Importers populate a [`Source`],
//! the matching engine reads from it.

pub mod error;
pub mod record;
pub mod sort;
pub mod source;

pub use error::TableError;
pub use record::Record;
pub use sort::{SortKey, ValueType};
pub use source::{sources_consistent, unify_sources, Source};
