//! Polymer chain detection from the sequence-definition categories.
//!
//! Entities listed in `_entity_poly_seq` are tied to their internal chains through
//! `_struct_asym` and kept when at least one monomer is a peptide-linking component according
//! to `_chem_comp`. Waters, ligands, sugars, and nucleic-acid-only entities drop out here.

use crate::io::FieldTable;
use crate::model::types::Monomer;
use crate::ops::error::Error;
use std::collections::HashMap;

const POLY_SEQ: &str = "_entity_poly_seq.";
const POLY_SEQ_ENTITY: &str = "_entity_poly_seq.entity_id";
const POLY_SEQ_NUM: &str = "_entity_poly_seq.num";
const POLY_SEQ_MON: &str = "_entity_poly_seq.mon_id";

const CHEM_COMP: &str = "_chem_comp.";
const CHEM_COMP_ID: &str = "_chem_comp.id";
const CHEM_COMP_TYPE: &str = "_chem_comp.type";

const STRUCT_ASYM: &str = "_struct_asym.";
const STRUCT_ASYM_ID: &str = "_struct_asym.id";
const STRUCT_ASYM_ENTITY: &str = "_struct_asym.entity_id";

/// A protein chain addressed by its internal (`label_asym_id`) identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymerChain {
    pub chain_id: String,
    pub entity_id: String,
    /// Authoritative residue list in `_entity_poly_seq` order.
    pub monomers: Vec<Monomer>,
    /// Smallest internal sequence number of the chain, the zero point of canonical indices.
    pub start_num: i32,
}

impl PolymerChain {
    pub fn len(&self) -> usize {
        self.monomers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }
}

/// Every protein chain of an entry, in entity then `_struct_asym` order.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedChains {
    chains: Vec<PolymerChain>,
    index: HashMap<String, usize>,
}

impl ClassifiedChains {
    pub fn get(&self, chain_id: &str) -> Option<&PolymerChain> {
        self.index.get(chain_id).map(|&i| &self.chains[i])
    }

    pub fn contains(&self, chain_id: &str) -> bool {
        self.index.contains_key(chain_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PolymerChain> {
        self.chains.iter()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    fn insert(&mut self, chain: PolymerChain) {
        match self.index.get(&chain.chain_id) {
            Some(&i) => self.chains[i] = chain,
            None => {
                self.index.insert(chain.chain_id.clone(), self.chains.len());
                self.chains.push(chain);
            }
        }
    }
}

/// Determines the protein chains of an entry and their canonical residue lists.
///
/// # Arguments
///
/// * `table` - Parsed field table of the entry.
///
/// # Returns
///
/// The classified chains with their minimum internal sequence numbers.
///
/// # Errors
///
/// [`Error::NoPolymerChainsFound`] when no chain qualifies, [`Error::MissingField`] when a
/// present `_entity_poly_seq` loop lacks one of its key columns, and
/// [`Error::MalformedField`] when a sequence number is not an integer.
pub fn classify_chains(table: &FieldTable) -> Result<ClassifiedChains, Error> {
    let polymers = collect_polymers(table)?;

    let chem_comps = table.loop_to_map(CHEM_COMP, CHEM_COMP_ID);

    let mut entity_to_chains: HashMap<&str, Vec<&str>> = HashMap::new();
    for row in table.loop_rows(STRUCT_ASYM) {
        let chain_id = row.get(STRUCT_ASYM_ID);
        let entity_id = row.get(STRUCT_ASYM_ENTITY);
        if let (Some(chain_id), Some(entity_id)) = (chain_id, entity_id) {
            entity_to_chains.entry(entity_id).or_default().push(chain_id);
        }
    }

    let mut classified = ClassifiedChains::default();
    for (entity_id, monomers) in polymers {
        let is_protein = monomers.iter().any(|monomer| {
            chem_comps
                .get(monomer.id.as_str())
                .and_then(|row| row.get(CHEM_COMP_TYPE))
                .is_some_and(is_peptide_type)
        });
        if !is_protein {
            continue;
        }

        let Some(start_num) = monomers.iter().map(|m| m.num).min() else {
            continue;
        };
        for chain_id in entity_to_chains.get(entity_id).into_iter().flatten() {
            classified.insert(PolymerChain {
                chain_id: chain_id.to_string(),
                entity_id: entity_id.to_string(),
                monomers: monomers.clone(),
                start_num,
            });
        }
    }

    if classified.is_empty() {
        return Err(Error::NoPolymerChainsFound);
    }
    Ok(classified)
}

/// Groups `_entity_poly_seq` rows by entity, preserving first appearance order.
fn collect_polymers(table: &FieldTable) -> Result<Vec<(&str, Vec<Monomer>)>, Error> {
    let mut polymers: Vec<(&str, Vec<Monomer>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (row_idx, row) in table.loop_rows(POLY_SEQ).into_iter().enumerate() {
        let entity_id = row
            .get(POLY_SEQ_ENTITY)
            .ok_or_else(|| Error::missing_field(POLY_SEQ_ENTITY))?;
        let num_str = row
            .get(POLY_SEQ_NUM)
            .ok_or_else(|| Error::missing_field(POLY_SEQ_NUM))?;
        let mon_id = row
            .get(POLY_SEQ_MON)
            .ok_or_else(|| Error::missing_field(POLY_SEQ_MON))?;

        let num = num_str
            .parse::<i32>()
            .map_err(|_| Error::malformed_field(POLY_SEQ_NUM, num_str, row_idx + 1))?;

        let slot = *positions.entry(entity_id).or_insert_with(|| {
            polymers.push((entity_id, Vec::new()));
            polymers.len() - 1
        });
        polymers[slot].1.push(Monomer::new(mon_id, num));
    }

    Ok(polymers)
}

fn is_peptide_type(chem_type: &str) -> bool {
    chem_type.to_ascii_lowercase().contains("peptide")
}
