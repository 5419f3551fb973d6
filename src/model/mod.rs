//! Data structures describing a reconciled mmCIF entry.
//!
//! This module defines residue identities, the dense per-chain mappings from canonical
//! sequence indices to observed residues, entry header metadata, and the residue code table
//! used to build one-letter sequences. These types are produced by `ops` and handed to
//! callers as the immutable result of a parse.

pub mod code_table;
pub mod header;
pub mod structure;
pub mod types;
