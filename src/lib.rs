//! # SeqresForge
//!
//! **SeqresForge** reconciles the two views of a protein that every mmCIF entry carries: the
//! authoritative polymer sequence declared in `_entity_poly_seq`, and the residues actually
//! resolved in the first model's `_atom_site` records. For each protein chain it produces a
//! one-letter sequence and a total mapping from canonical sequence index to either an
//! observed residue position or an explicit missing-residue marker.
//!
//! ## Features
//!
//! - **Buffered mmCIF tokenizer** – A buffered reader flattens one mmCIF data block into a `FieldTable` of item names and value columns, with line-accurate diagnostics.
//! - **Protein chain classification** – Entities are kept when any monomer is a peptide-linking component, then expanded to every internal chain that instantiates them.
//! - **Total residue mappings** – Every canonical index of a chain maps to exactly one `ResidueAtPosition`, observed or missing, so downstream alignment never meets holes.
//! - **Injectable code tables** – Residue names become sequence letters through a `CodeTable`, built in or loaded from TOML, with `X` for anything unknown.
//! - **Configurable fault handling** – Per-call capture or fail-fast modes, with per-chain faults keyed by file and chain so one bad chain never hides its siblings.
//! - **Batch parsing** – Independent entries parse in parallel behind the `parallel` feature while preserving input order.

mod db;
mod model;
mod utils;

pub mod io;
pub mod ops;

pub use model::code_table::{CodeTable, CodeTableError, UNKNOWN_RESIDUE};
pub use model::header::MmcifHeader;
pub use model::structure::{ChainMapping, MmcifObject};
pub use model::types::{HetFlag, Monomer, ResidueAtPosition, ResiduePosition};
