//! Reconciled view of an mmCIF entry.
//!
//! An [`MmcifObject`] ties every author chain to its one-letter polymer sequence and to a
//! dense, canonically indexed record of which residues were observed in the first model and
//! where. It is built once by the reconciliation pipeline and only read afterwards.

use super::header::MmcifHeader;
use super::types::ResidueAtPosition;
use crate::io::FieldTable;
use std::collections::BTreeMap;
use std::fmt;

/// Canonical-index to residue mapping for one chain.
///
/// Indices run contiguously over `0..len()`; position `i` describes the `i`-th residue of the
/// chain's polymer sequence whether or not it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainMapping {
    residues: Vec<ResidueAtPosition>,
}

impl ChainMapping {
    pub(crate) fn from_dense(residues: Vec<ResidueAtPosition>) -> Self {
        Self { residues }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Residue at canonical index `index`.
    pub fn get(&self, index: usize) -> Option<&ResidueAtPosition> {
        self.residues.get(index)
    }

    /// Iterates `(canonical_index, residue)` pairs in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ResidueAtPosition)> {
        self.residues.iter().enumerate()
    }

    pub fn residues(&self) -> &[ResidueAtPosition] {
        &self.residues
    }

    pub fn missing_count(&self) -> usize {
        self.residues.iter().filter(|r| r.is_missing()).count()
    }

    pub fn observed_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Canonical indices of residues absent from the coordinates.
    pub fn missing_indices(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, residue)| residue.is_missing())
            .map(|(index, _)| index)
            .collect()
    }
}

/// Reconciled sequences and structure mappings of one mmCIF entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MmcifObject {
    file_id: String,
    header: MmcifHeader,
    chain_to_seqres: BTreeMap<String, String>,
    seqres_to_structure: BTreeMap<String, ChainMapping>,
    raw_table: FieldTable,
}

impl MmcifObject {
    pub(crate) fn new(
        file_id: String,
        header: MmcifHeader,
        chain_to_seqres: BTreeMap<String, String>,
        seqres_to_structure: BTreeMap<String, ChainMapping>,
        raw_table: FieldTable,
    ) -> Self {
        Self {
            file_id,
            header,
            chain_to_seqres,
            seqres_to_structure,
            raw_table,
        }
    }

    /// Caller-supplied identifier, echoed unchanged.
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn header(&self) -> &MmcifHeader {
        &self.header
    }

    /// Author chain id to one-letter polymer sequence.
    pub fn chain_to_seqres(&self) -> &BTreeMap<String, String> {
        &self.chain_to_seqres
    }

    /// Author chain id to canonical-index residue mapping.
    pub fn seqres_to_structure(&self) -> &BTreeMap<String, ChainMapping> {
        &self.seqres_to_structure
    }

    /// The field table the object was reconciled from.
    ///
    /// Downstream consumers read items the reconciled model does not carry from here.
    pub fn raw_table(&self) -> &FieldTable {
        &self.raw_table
    }

    pub fn sequence(&self, author_chain_id: &str) -> Option<&str> {
        self.chain_to_seqres.get(author_chain_id).map(String::as_str)
    }

    pub fn mapping(&self, author_chain_id: &str) -> Option<&ChainMapping> {
        self.seqres_to_structure.get(author_chain_id)
    }

    /// Author chain ids in lexical order.
    pub fn chain_ids(&self) -> impl Iterator<Item = &str> {
        self.chain_to_seqres.keys().map(String::as_str)
    }

    pub fn chain_count(&self) -> usize {
        self.chain_to_seqres.len()
    }
}

impl fmt::Display for MmcifObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MmcifObject {{ file_id: \"{}\", chains: {}, method: \"{}\" }}",
            self.file_id,
            self.chain_count(),
            self.header.structure_method
        )
    }
}
