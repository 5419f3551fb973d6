//! Densifies observed residues into total per-chain mappings and builds sequences.
//!
//! For every classified chain the canonical index range `0..N` is walked once: observed
//! slots are copied, every other index becomes an explicit missing residue named after the
//! polymer sequence, and the one-letter sequence is derived from that same residue list.

use crate::model::code_table::CodeTable;
use crate::model::structure::ChainMapping;
use crate::model::types::ResidueAtPosition;
use crate::ops::classify::ClassifiedChains;
use crate::ops::error::Error;
use crate::ops::walk::AtomSiteWalk;
use std::collections::BTreeMap;

/// Outcome of gap filling for one entry.
#[derive(Debug, Default)]
pub struct FilledChains {
    /// Author chain id to one-letter sequence.
    pub chain_to_seqres: BTreeMap<String, String>,
    /// Author chain id to dense canonical mapping.
    pub seqres_to_structure: BTreeMap<String, ChainMapping>,
    /// Internal chains that could not be resolved, with the reason, in classification order.
    pub failures: Vec<(String, Error)>,
}

/// Builds dense mappings and sequence strings with an injected residue code table.
#[derive(Debug, Clone, Copy)]
pub struct SequenceBuilder<'a> {
    code_table: &'a CodeTable,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(code_table: &'a CodeTable) -> Self {
        Self { code_table }
    }

    /// Fills every classified chain the walk did not mark as failed.
    ///
    /// Chains whose internal id never received an author id during the walk are reported
    /// in [`FilledChains::failures`] as [`Error::UnresolvedChainIdentity`]; the remaining
    /// chains are still filled. Chains listed in [`AtomSiteWalk::failures`] are left out
    /// entirely since their fault is already recorded there.
    ///
    /// # Arguments
    ///
    /// * `chains` - Protein chains from the classifier.
    /// * `walk` - Observations gathered from the first model.
    pub fn fill(&self, chains: &ClassifiedChains, walk: &AtomSiteWalk) -> FilledChains {
        let mut filled = FilledChains::default();

        for chain in chains.iter() {
            if walk.is_failed(&chain.chain_id) {
                continue;
            }
            let Some(author_chain_id) = walk.author_chain_ids.get(&chain.chain_id) else {
                filled
                    .failures
                    .push((chain.chain_id.clone(), Error::unresolved_chain(&chain.chain_id)));
                continue;
            };
            let observed = walk.observed.get(author_chain_id);

            let residues = chain
                .monomers
                .iter()
                .enumerate()
                .map(|(index, monomer)| {
                    observed
                        .and_then(|sparse| sparse.get(index))
                        .cloned()
                        .unwrap_or_else(|| ResidueAtPosition::missing(&monomer.id))
                })
                .collect();

            let sequence = self
                .code_table
                .translate(chain.monomers.iter().map(|m| m.id.as_str()));

            filled
                .chain_to_seqres
                .insert(author_chain_id.clone(), sequence);
            filled
                .seqres_to_structure
                .insert(author_chain_id.clone(), ChainMapping::from_dense(residues));
        }

        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::FieldTable;
    use crate::ops::classify::classify_chains;
    use crate::ops::walk::walk_atom_sites;

    const PREAMBLE: &str = "\
        data_fill\n\
        loop_\n\
        _chem_comp.id\n\
        _chem_comp.type\n\
        MET 'L-peptide linking'\n\
        GLY 'peptide linking'\n\
        SER 'L-peptide linking'\n\
        PCA 'L-peptide linking'\n\
        loop_\n\
        _entity_poly_seq.entity_id\n\
        _entity_poly_seq.num\n\
        _entity_poly_seq.mon_id\n\
        1 5 MET\n\
        1 6 GLY\n\
        1 7 SER\n\
        1 8 PCA\n\
        loop_\n\
        _struct_asym.id\n\
        _struct_asym.entity_id\n\
        A 1\n\
        B 1\n\
        loop_\n\
        _atom_site.group_PDB\n\
        _atom_site.label_comp_id\n\
        _atom_site.label_asym_id\n\
        _atom_site.label_seq_id\n\
        _atom_site.auth_seq_id\n\
        _atom_site.auth_asym_id\n";

    fn fill_with(rows: &str, code_table: &CodeTable) -> FilledChains {
        let table: FieldTable = format!("{PREAMBLE}{rows}").parse().expect("fixture parses");
        let chains = classify_chains(&table).unwrap();
        let walk = walk_atom_sites(&table, &chains).unwrap();
        SequenceBuilder::new(code_table).fill(&chains, &walk)
    }

    #[test]
    fn fill_inserts_missing_residues_for_unobserved_indices() {
        let filled = fill_with(
            "ATOM MET A 5 1 A\n\
             ATOM SER A 7 3 A\n\
             ATOM MET B 5 1 B\n\
             ATOM GLY B 6 2 B\n\
             ATOM SER B 7 3 B\n\
             HETATM PCA B 8 4 B\n",
            &CodeTable::protein(),
        );

        let chain_a = filled.seqres_to_structure.get("A").unwrap();
        assert_eq!(chain_a.len(), 4);
        assert_eq!(chain_a.missing_indices(), vec![1, 3]);
        let gap = chain_a.get(1).unwrap();
        assert_eq!(gap.name(), "GLY");
        assert!(gap.het_flag().is_standard());

        let chain_b = filled.seqres_to_structure.get("B").unwrap();
        assert_eq!(chain_b.missing_count(), 0);
        assert_eq!(chain_b.get(3).unwrap().het_flag().to_string(), "H_PCA");
        assert!(filled.failures.is_empty());
    }

    #[test]
    fn fill_builds_sequences_independent_of_observation() {
        let filled = fill_with("ATOM MET A 5 1 A\n", &CodeTable::protein());
        assert_eq!(filled.chain_to_seqres.get("A").map(String::as_str), Some("MGSE"));
        assert_eq!(filled.seqres_to_structure.get("A").unwrap().len(), 4);
    }

    #[test]
    fn fill_uses_the_injected_code_table() {
        let table = CodeTable::from_pairs("tiny", [("MET", "M"), ("SER", "s")]);
        let filled = fill_with("ATOM MET A 5 1 A\n", &table);
        assert_eq!(filled.chain_to_seqres.get("A").map(String::as_str), Some("MXsX"));
    }

    #[test]
    fn fill_leaves_out_chains_that_failed_the_walk() {
        let filled = fill_with(
            "ATOM MET A 5 1 A\n\
             ATOM MET B 12 1 B\n",
            &CodeTable::protein(),
        );
        assert!(filled.seqres_to_structure.contains_key("A"));
        assert!(!filled.seqres_to_structure.contains_key("B"));
        assert!(!filled.chain_to_seqres.contains_key("B"));
        assert!(filled.failures.is_empty());
    }

    #[test]
    fn fill_reports_chains_without_first_model_atoms() {
        let filled = fill_with("ATOM MET A 5 1 A\n", &CodeTable::protein());
        assert_eq!(filled.failures.len(), 1);
        let (chain_id, error) = &filled.failures[0];
        assert_eq!(chain_id, "B");
        assert!(matches!(error, Error::UnresolvedChainIdentity { chain_id } if chain_id == "B"));
        assert!(filled.seqres_to_structure.contains_key("A"));
    }
}
