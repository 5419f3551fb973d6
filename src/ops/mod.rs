//! Operations that reconcile an mmCIF field table into sequences and residue mappings.
//!
//! Reconciliation runs in three stages: chain classification finds the protein chains and
//! their authoritative residue lists, the atom-site walk records which residues the first
//! model actually resolves, and gap filling turns those observations into total per-chain
//! mappings and one-letter sequences. The `parse_*` entry points chain the stages together
//! and collect faults according to a per-call [`ErrorMode`].

mod classify;
mod error;
mod fill;
mod parse;
mod walk;

pub use classify::{ClassifiedChains, PolymerChain, classify_chains};

pub use walk::{AtomSiteWalk, SparseChain, walk_atom_sites};

pub use fill::{FilledChains, SequenceBuilder};

pub use parse::{
    ErrorKey, ErrorMode, ParseConfig, ParsingResult, parse_batch, parse_reader, parse_str,
    parse_table,
};

pub use error::{Error, ErrorKind};
