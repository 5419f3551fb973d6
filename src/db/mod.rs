//! Embedded residue code tables.
//!
//! Tables ship as TOML under `tables/` and are deserialized once on first use, so every
//! parse shares the same immutable built-in mapping.

mod loader;
mod schema;
mod store;

pub use schema::CodeTableFile;
pub use store::protein_letters;
