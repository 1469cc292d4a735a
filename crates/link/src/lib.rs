//! `recmatch-link`: approximate record-matching engine.
//!
//! Pure engine crate: receives pre-loaded [`Source`]s, returns scored
//! [`MatchResult`]s. No CLI or IO dependencies.
//!
//! [`Source`]: recmatch_table::Source

pub mod config;
pub mod digest;
pub mod error;
pub mod index;
pub mod mapping;
pub mod model;
pub mod multimap;
pub mod profile;

pub use config::ProfileConfig;
pub use digest::Digest;
pub use error::LinkError;
pub use index::{Candidates, FuzzyEntry, ProcessedSource};
pub use mapping::{CompareKind, Mapping, DEFAULT_PREFIX_LEN};
pub use model::MatchResult;
pub use profile::{Master, Profile};
