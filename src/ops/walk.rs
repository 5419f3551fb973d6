//! Single pass over `_atom_site` that records which canonical residues were observed.
//!
//! Each first-model atom of a classified chain contributes the internal-to-author chain
//! translation and one observed [`ResidueAtPosition`] at its canonical index. Atoms of the
//! same residue overwrite one another with identical data, so row order does not matter.

use crate::io::{FieldTable, is_set};
use crate::model::types::{HetFlag, ResidueAtPosition, ResiduePosition};
use crate::ops::classify::{ClassifiedChains, PolymerChain};
use crate::ops::error::Error;
use log::{debug, warn};
use std::collections::HashMap;

const COMP_ID: &str = "_atom_site.label_comp_id";
const AUTH_ASYM_ID: &str = "_atom_site.auth_asym_id";
const LABEL_ASYM_ID: &str = "_atom_site.label_asym_id";
const AUTH_SEQ_ID: &str = "_atom_site.auth_seq_id";
const LABEL_SEQ_ID: &str = "_atom_site.label_seq_id";
const INS_CODE: &str = "_atom_site.pdbx_PDB_ins_code";
const GROUP_PDB: &str = "_atom_site.group_PDB";
const MODEL_NUM: &str = "_atom_site.pdbx_PDB_model_num";

/// Observed residues of one author chain, one slot per canonical index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseChain {
    slots: Vec<Option<ResidueAtPosition>>,
}

impl SparseChain {
    fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    fn insert(&mut self, index: usize, residue: ResidueAtPosition) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(residue);
    }

    pub fn get(&self, index: usize) -> Option<&ResidueAtPosition> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn observed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Result of walking the atom sites of the first model.
#[derive(Debug, Default)]
pub struct AtomSiteWalk {
    /// Internal chain id to author chain id; the last atom seen for a chain wins.
    pub author_chain_ids: HashMap<String, String>,
    /// Observed residues keyed by author chain id.
    pub observed: HashMap<String, SparseChain>,
    /// Internal chains with an uninterpretable atom, with the first fault, in encounter order.
    pub failures: Vec<(String, Error)>,
}

impl AtomSiteWalk {
    /// Whether an atom of internal chain `chain_id` could not be placed.
    pub fn is_failed(&self, chain_id: &str) -> bool {
        self.failures.iter().any(|(failed, _)| failed == chain_id)
    }
}

/// Column slices of the `_atom_site` loop used by the walker.
struct AtomSiteColumns<'a> {
    comp_id: &'a [String],
    auth_asym_id: &'a [String],
    label_asym_id: &'a [String],
    auth_seq_id: &'a [String],
    label_seq_id: &'a [String],
    ins_code: Option<&'a [String]>,
    group_pdb: Option<&'a [String]>,
    model_num: Option<&'a [String]>,
}

impl<'a> AtomSiteColumns<'a> {
    fn from_table(table: &'a FieldTable) -> Result<Self, Error> {
        let required = |key: &str| table.get(key).ok_or_else(|| Error::missing_field(key));
        Ok(Self {
            comp_id: required(COMP_ID)?,
            auth_asym_id: required(AUTH_ASYM_ID)?,
            label_asym_id: required(LABEL_ASYM_ID)?,
            auth_seq_id: required(AUTH_SEQ_ID)?,
            label_seq_id: required(LABEL_SEQ_ID)?,
            ins_code: table.get(INS_CODE),
            group_pdb: table.get(GROUP_PDB),
            model_num: table.get(MODEL_NUM),
        })
    }

    fn row_count(&self) -> usize {
        [
            self.comp_id.len(),
            self.auth_asym_id.len(),
            self.label_asym_id.len(),
            self.auth_seq_id.len(),
            self.label_seq_id.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }

    fn optional(column: Option<&'a [String]>, row: usize) -> Option<&'a str> {
        column.and_then(|values| values.get(row)).map(String::as_str)
    }
}

/// Walks every `_atom_site` row of the first model.
///
/// The first model is the one named by the first row's `pdbx_PDB_model_num`; rows of other
/// models are skipped. A table without a model column is treated as a single model. Rows of
/// chains absent from `chains` are ignored.
///
/// # Arguments
///
/// * `table` - Parsed field table of the entry.
/// * `chains` - Protein chains produced by the classifier.
///
/// # Errors
///
/// [`Error::MissingField`] when a required `_atom_site` column is absent.
///
/// Faults confined to one chain do not fail the walk: a sequence number that is not an
/// integer ([`Error::MalformedField`]) or lies outside the chain's polymer sequence
/// ([`Error::SequenceIndexOutOfRange`]) is recorded in [`AtomSiteWalk::failures`] and the
/// chain's remaining atoms are skipped.
pub fn walk_atom_sites(
    table: &FieldTable,
    chains: &ClassifiedChains,
) -> Result<AtomSiteWalk, Error> {
    let columns = AtomSiteColumns::from_table(table)?;
    let first_model = AtomSiteColumns::optional(columns.model_num, 0);

    let mut walk = AtomSiteWalk::default();
    let mut skipped_rows = 0usize;

    for row in 0..columns.row_count() {
        if let Some(model) = first_model {
            if AtomSiteColumns::optional(columns.model_num, row) != Some(model) {
                skipped_rows += 1;
                continue;
            }
        }

        let label_asym_id = columns.label_asym_id[row].as_str();
        let Some(chain) = chains.get(label_asym_id) else {
            continue;
        };

        if walk.is_failed(label_asym_id) {
            continue;
        }

        let author_chain_id = columns.auth_asym_id[row].as_str();
        record_author_chain_id(&mut walk.author_chain_ids, label_asym_id, author_chain_id);

        match observe_row(&columns, row, chain, author_chain_id) {
            Ok((index, residue)) => walk
                .observed
                .entry(author_chain_id.to_string())
                .or_insert_with(|| SparseChain::with_len(chain.len()))
                .insert(index, residue),
            Err(error) => {
                warn!("skipping remaining atoms of chain '{label_asym_id}': {error}");
                walk.failures.push((label_asym_id.to_string(), error));
            }
        }
    }

    if skipped_rows > 0 {
        debug!("skipped {skipped_rows} atom sites outside the first model");
    }

    Ok(walk)
}

/// Builds the observed residue of one atom row and its canonical index.
fn observe_row(
    columns: &AtomSiteColumns<'_>,
    row: usize,
    chain: &PolymerChain,
    author_chain_id: &str,
) -> Result<(usize, ResidueAtPosition), Error> {
    let residue_name = columns.comp_id[row].as_str();
    let is_hetatm = AtomSiteColumns::optional(columns.group_pdb, row)
        .is_some_and(|group| group.eq_ignore_ascii_case("HETATM"));
    let het_flag = HetFlag::classify(is_hetatm, residue_name);

    let insertion_code = AtomSiteColumns::optional(columns.ins_code, row)
        .filter(|code| is_set(code))
        .and_then(|code| code.chars().next())
        .unwrap_or(' ');

    let residue_number = parse_int(AUTH_SEQ_ID, &columns.auth_seq_id[row], row)?;
    let seq_num = parse_int(LABEL_SEQ_ID, &columns.label_seq_id[row], row)?;

    let index = seq_num
        .checked_sub(chain.start_num)
        .and_then(|offset| usize::try_from(offset).ok())
        .filter(|&index| index < chain.len())
        .ok_or_else(|| Error::SequenceIndexOutOfRange {
            chain_id: chain.chain_id.clone(),
            seq_num,
            length: chain.len(),
        })?;

    let position = ResiduePosition::new(author_chain_id, residue_number, insertion_code);
    Ok((
        index,
        ResidueAtPosition::observed(position, residue_name, het_flag),
    ))
}

fn record_author_chain_id(
    author_chain_ids: &mut HashMap<String, String>,
    label_asym_id: &str,
    author_chain_id: &str,
) {
    match author_chain_ids.get_mut(label_asym_id) {
        Some(existing) if existing == author_chain_id => {}
        Some(existing) => {
            warn!(
                "chain '{label_asym_id}' maps to author chain '{existing}' and '{author_chain_id}'; keeping '{author_chain_id}'"
            );
            *existing = author_chain_id.to_string();
        }
        None => {
            author_chain_ids.insert(label_asym_id.to_string(), author_chain_id.to_string());
        }
    }
}

fn parse_int(field: &str, value: &str, row: usize) -> Result<i32, Error> {
    value
        .parse::<i32>()
        .map_err(|_| Error::malformed_field(field, value, row + 1))
}
