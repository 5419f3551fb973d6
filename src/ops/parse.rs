//! Entry points that run classification, atom-site walking, and gap filling for an entry.
//!
//! Every call is independent: the field table is only read, and the returned
//! [`ParsingResult`] owns all of its data. Callers pick per call whether faults are captured
//! into the result ([`ErrorMode::Capture`]) or returned immediately ([`ErrorMode::FailFast`]).

use crate::io::{self, FieldTable};
use crate::model::code_table::CodeTable;
use crate::model::header::MmcifHeader;
use crate::model::structure::MmcifObject;
use crate::ops::classify::classify_chains;
use crate::ops::error::Error;
use crate::ops::fill::SequenceBuilder;
use crate::ops::walk::walk_atom_sites;
use crate::utils::parallel::*;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::BufRead;

/// How faults encountered during a parse are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Record faults in [`ParsingResult::errors`] and return a best-effort result.
    #[default]
    Capture,
    /// Return the first fault as `Err`.
    FailFast,
}

/// Per-call settings for reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    pub error_mode: ErrorMode,
    /// Table used to translate residue codes into sequence letters.
    pub code_table: CodeTable,
}

impl ParseConfig {
    /// Capture mode with the built-in protein code table.
    pub fn capture() -> Self {
        Self::default()
    }

    /// Fail-fast mode with the built-in protein code table.
    pub fn fail_fast() -> Self {
        Self {
            error_mode: ErrorMode::FailFast,
            ..Default::default()
        }
    }

    pub fn with_code_table(mut self, code_table: CodeTable) -> Self {
        self.code_table = code_table;
        self
    }
}

/// Key of [`ParsingResult::errors`]: file id and internal chain id (empty for whole-file
/// faults).
pub type ErrorKey = (String, String);

/// Reconciled entry plus the faults encountered while building it.
///
/// `mmcif_object` is `None` when the entry could not be reconciled at all; callers must check
/// it before reading anything else.
#[derive(Debug, Default)]
pub struct ParsingResult {
    pub mmcif_object: Option<MmcifObject>,
    pub errors: BTreeMap<ErrorKey, Error>,
}

impl ParsingResult {
    fn failed(file_id: &str, error: Error) -> Self {
        Self {
            mmcif_object: None,
            errors: BTreeMap::from([((file_id.to_string(), String::new()), error)]),
        }
    }

    /// `true` when an object was produced and no fault was recorded.
    pub fn is_complete(&self) -> bool {
        self.mmcif_object.is_some() && self.errors.is_empty()
    }
}

/// Reconciles an already tokenized field table.
///
/// The table is copied into the result so the object never borrows from it.
///
/// # Arguments
///
/// * `file_id` - Caller-chosen identifier echoed into the result and its error keys.
/// * `table` - Field table of the entry.
/// * `config` - Error mode and code table.
///
/// # Returns
///
/// A [`ParsingResult`]. An entry without protein chains yields no object and a single
/// [`Error::NoPolymerChainsFound`] keyed by `(file_id, "")` in either mode.
///
/// # Errors
///
/// Only in [`ErrorMode::FailFast`]: the first underlying parse failure or chain fault. In
/// [`ErrorMode::Capture`] faults confined to one chain are keyed by `(file_id, chain_id)` and
/// the other chains are still reconciled.
pub fn parse_table(
    file_id: &str,
    table: &FieldTable,
    config: &ParseConfig,
) -> Result<ParsingResult, Error> {
    let outcome = reconcile(file_id, table, config);
    settle(file_id, outcome, config.error_mode)
}

/// Tokenizes mmCIF text and reconciles it.
///
/// Tokenizer failures are underlying parse failures and follow the configured
/// [`ErrorMode`].
pub fn parse_str(
    file_id: &str,
    text: &str,
    config: &ParseConfig,
) -> Result<ParsingResult, Error> {
    parse_reader(file_id, text.as_bytes(), config)
}

/// Reads mmCIF text from `reader` and reconciles it.
pub fn parse_reader<R: BufRead>(
    file_id: &str,
    reader: R,
    config: &ParseConfig,
) -> Result<ParsingResult, Error> {
    match io::read_field_table(reader) {
        Ok(table) => parse_table(file_id, &table, config),
        Err(e) => settle(file_id, Err(Error::from(e)), config.error_mode),
    }
}

/// Parses independent `(file_id, text)` inputs, in parallel when the `parallel` feature is
/// enabled.
///
/// Results come back in input order, one per input, each following `config.error_mode`.
pub fn parse_batch<S>(
    inputs: &[(S, S)],
    config: &ParseConfig,
) -> Vec<Result<ParsingResult, Error>>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|(file_id, text)| parse_str(file_id.as_ref(), text.as_ref(), config))
        .collect()
}

fn reconcile(
    file_id: &str,
    table: &FieldTable,
    config: &ParseConfig,
) -> Result<ParsingResult, Error> {
    let header = MmcifHeader::from_table(table);

    let chains = match classify_chains(table) {
        Ok(chains) => chains,
        Err(Error::NoPolymerChainsFound) => {
            debug!("{file_id}: no protein chains");
            return Ok(ParsingResult::failed(file_id, Error::NoPolymerChainsFound));
        }
        Err(e) => return Err(e),
    };
    debug!("{file_id}: classified {} protein chains", chains.len());

    let mut walk = walk_atom_sites(table, &chains)?;
    debug!(
        "{file_id}: first model resolves {} of {} protein chains",
        walk.author_chain_ids.len(),
        chains.len()
    );
    if config.error_mode == ErrorMode::FailFast && !walk.failures.is_empty() {
        let (_, error) = walk.failures.swap_remove(0);
        return Err(error);
    }

    let filled = SequenceBuilder::new(&config.code_table).fill(&chains, &walk);

    let mut errors = BTreeMap::new();
    for (chain_id, error) in walk.failures.into_iter().chain(filled.failures) {
        if config.error_mode == ErrorMode::FailFast {
            return Err(error);
        }
        warn!("{file_id}: {error}");
        errors.insert((file_id.to_string(), chain_id), error);
    }

    let object = MmcifObject::new(
        file_id.to_string(),
        header,
        filled.chain_to_seqres,
        filled.seqres_to_structure,
        table.clone(),
    );

    Ok(ParsingResult {
        mmcif_object: Some(object),
        errors,
    })
}

fn settle(
    file_id: &str,
    outcome: Result<ParsingResult, Error>,
    mode: ErrorMode,
) -> Result<ParsingResult, Error> {
    match (outcome, mode) {
        (Ok(result), _) => Ok(result),
        (Err(error), ErrorMode::Capture) => {
            warn!("{file_id}: {error}");
            Ok(ParsingResult::failed(file_id, error))
        }
        (Err(error), ErrorMode::FailFast) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::HetFlag;
    use crate::ops::error::ErrorKind;

    const CHEM_COMP: &str = "\
        loop_\n\
        _chem_comp.id\n\
        _chem_comp.type\n\
        ALA 'L-peptide linking'\n\
        GLY 'peptide linking'\n\
        LYS 'L-peptide linking'\n\
        SER 'L-peptide linking'\n\
        VAL 'L-peptide linking'\n\
        TRP 'L-peptide linking'\n\
        HOH non-polymer\n\
        ZN non-polymer\n";

    const ATOM_SITE_HEADER: &str = "\
        loop_\n\
        _atom_site.group_PDB\n\
        _atom_site.id\n\
        _atom_site.type_symbol\n\
        _atom_site.label_atom_id\n\
        _atom_site.label_comp_id\n\
        _atom_site.label_asym_id\n\
        _atom_site.label_entity_id\n\
        _atom_site.label_seq_id\n\
        _atom_site.pdbx_PDB_ins_code\n\
        _atom_site.Cartn_x\n\
        _atom_site.Cartn_y\n\
        _atom_site.Cartn_z\n\
        _atom_site.auth_seq_id\n\
        _atom_site.auth_asym_id\n\
        _atom_site.pdbx_PDB_model_num\n";

    fn entry(poly_seq: &str, struct_asym: &str, atoms: &str) -> String {
        format!(
            "data_TEST\n\
             _entry.id TEST\n\
             _exptl.entry_id TEST\n\
             _exptl.method 'X-RAY DIFFRACTION'\n\
             _refine.ls_d_res_high 1.90\n\
             loop_\n\
             _pdbx_audit_revision_history.ordinal\n\
             _pdbx_audit_revision_history.revision_date\n\
             1 2015-06-03\n\
             2 2018-01-17\n\
             {CHEM_COMP}\
             loop_\n\
             _entity_poly_seq.entity_id\n\
             _entity_poly_seq.num\n\
             _entity_poly_seq.mon_id\n\
             {poly_seq}\
             loop_\n\
             _struct_asym.id\n\
             _struct_asym.entity_id\n\
             {struct_asym}\
             {ATOM_SITE_HEADER}\
             {atoms}"
        )
    }

    fn complete_chain() -> String {
        entry(
            "1 1 ALA\n1 2 GLY\n1 3 LYS\n",
            "A 1\n",
            "ATOM 1 N N ALA A 1 1 ? 0.0 0.0 0.0 10 A 1\n\
             ATOM 2 C CA ALA A 1 1 ? 1.0 0.0 0.0 10 A 1\n\
             ATOM 3 N N GLY A 1 2 ? 2.0 0.0 0.0 11 A 1\n\
             ATOM 4 N N LYS A 1 3 ? 3.0 0.0 0.0 12 A 1\n",
        )
    }

    fn gapped_chain() -> String {
        entry(
            "1 5 SER\n1 6 VAL\n1 7 TRP\n1 8 GLY\n1 9 LYS\n1 10 ALA\n",
            "A 1\n",
            "ATOM 1 N N SER A 1 5 ? 0.0 0.0 0.0 105 A 1\n\
             ATOM 2 N N VAL A 1 6 ? 0.0 0.0 0.0 106 A 1\n\
             ATOM 3 N N GLY A 1 8 ? 0.0 0.0 0.0 108 A 1\n\
             ATOM 4 N N LYS A 1 9 ? 0.0 0.0 0.0 109 A 1\n\
             ATOM 5 N N ALA A 1 10 ? 0.0 0.0 0.0 110 A 1\n\
             ATOM 6 N N TRP A 1 7 ? 0.0 0.0 0.0 107 A 2\n",
        )
    }

    fn object(result: &ParsingResult) -> &MmcifObject {
        result.mmcif_object.as_ref().expect("object built")
    }

    #[test]
    fn parse_complete_chain_has_no_missing_residues() {
        let result = parse_str("1abc", &complete_chain(), &ParseConfig::capture()).unwrap();
        assert!(result.is_complete());

        let object = object(&result);
        assert_eq!(object.file_id(), "1abc");
        assert_eq!(object.sequence("A"), Some("AGK"));

        let mapping = object.mapping("A").unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.missing_count(), 0);
        assert!(mapping.iter().all(|(_, r)| r.het_flag() == &HetFlag::Standard));
        assert_eq!(mapping.get(2).unwrap().position().unwrap().residue_number, 12);
    }

    #[test]
    fn parse_offsets_canonical_indices_by_first_sequence_number() {
        let result = parse_str("gap", &gapped_chain(), &ParseConfig::capture()).unwrap();
        let object = object(&result);

        let mapping = object.mapping("A").unwrap();
        assert_eq!(mapping.len(), 6);
        assert_eq!(mapping.missing_indices(), vec![2]);
        let missing = mapping.get(2).unwrap();
        assert_eq!(missing.name(), "TRP");
        assert!(missing.position().is_none());
        assert_eq!(
            mapping.get(0).unwrap().position().unwrap().residue_number,
            105
        );
        assert_eq!(object.sequence("A"), Some("SVWGKA"));
    }

    #[test]
    fn parse_solvent_only_entry_reports_no_polymer_chains() {
        let text = entry(
            "",
            "W 2\n",
            "HETATM 1 O O HOH W 2 . ? 0.0 0.0 0.0 301 A 1\n",
        );
        for config in [ParseConfig::capture(), ParseConfig::fail_fast()] {
            let result = parse_str("solvent", &text, &config).unwrap();
            assert!(result.mmcif_object.is_none());
            assert_eq!(result.errors.len(), 1);
            let error = &result.errors[&("solvent".to_string(), String::new())];
            assert_eq!(error.kind(), ErrorKind::NoPolymerChainsFound);
        }
    }

    #[test]
    fn parse_unobserved_chain_is_reported_without_dropping_siblings() {
        let text = entry(
            "1 1 ALA\n1 2 GLY\n2 1 LYS\n2 2 SER\n",
            "A 1\nB 2\n",
            "ATOM 1 N N ALA A 1 1 ? 0.0 0.0 0.0 1 H 1\n\
             ATOM 2 N N GLY A 1 2 ? 0.0 0.0 0.0 2 H 1\n",
        );

        let result = parse_str("pair", &text, &ParseConfig::capture()).unwrap();
        let object = object(&result);
        assert_eq!(object.sequence("H"), Some("AG"));
        assert_eq!(object.chain_count(), 1);

        let error = &result.errors[&("pair".to_string(), "B".to_string())];
        assert_eq!(error.kind(), ErrorKind::UnresolvedChainIdentity);

        let err = parse_str("pair", &text, &ParseConfig::fail_fast()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedChainIdentity);
    }

    fn sibling_entry(bad_row: &str) -> String {
        entry(
            "1 1 ALA\n1 2 GLY\n2 1 LYS\n2 2 SER\n",
            "A 1\nB 2\n",
            &format!(
                "ATOM 1 N N ALA A 1 1 ? 0.0 0.0 0.0 1 A 1\n\
                 ATOM 2 N N GLY A 1 2 ? 0.0 0.0 0.0 2 A 1\n\
                 ATOM 3 N N LYS B 2 1 ? 0.0 0.0 0.0 1 B 1\n\
                 {bad_row}"
            ),
        )
    }

    #[test]
    fn parse_keeps_siblings_of_a_chain_with_out_of_range_atoms() {
        let text = sibling_entry("ATOM 4 N N SER B 2 9 ? 0.0 0.0 0.0 9 B 1\n");

        let result = parse_str("sib", &text, &ParseConfig::capture()).unwrap();
        let object = object(&result);
        assert_eq!(object.sequence("A"), Some("AG"));
        assert_eq!(object.mapping("A").unwrap().missing_count(), 0);
        assert!(object.mapping("B").is_none());

        assert_eq!(result.errors.len(), 1);
        let error = &result.errors[&("sib".to_string(), "B".to_string())];
        assert!(matches!(
            error,
            Error::SequenceIndexOutOfRange { seq_num: 9, length: 2, .. }
        ));
        assert!(error.is_chain_scoped());

        let err = parse_str("sib", &text, &ParseConfig::fail_fast()).unwrap_err();
        assert!(matches!(err, Error::SequenceIndexOutOfRange { .. }));
    }

    #[test]
    fn parse_keeps_siblings_of_a_chain_with_malformed_numbers() {
        let text = sibling_entry("ATOM 4 N N SER B 2 x ? 0.0 0.0 0.0 2 B 1\n");

        let result = parse_str("sib2", &text, &ParseConfig::capture()).unwrap();
        assert_eq!(object(&result).sequence("A"), Some("AG"));
        let error = &result.errors[&("sib2".to_string(), "B".to_string())];
        assert!(matches!(error, Error::MalformedField { .. }));
    }

    #[test]
    fn parse_maps_water_and_ligand_records_in_polymer_chains() {
        let text = entry(
            "1 1 ALA\n1 2 HOH\n1 3 ZN\n",
            "A 1\n",
            "ATOM 1 N N ALA A 1 1 ? 0.0 0.0 0.0 1 A 1\n\
             HETATM 2 O O HOH A 1 2 ? 0.0 0.0 0.0 2 A 1\n\
             HETATM 3 ZN ZN ZN A 1 3 ? 0.0 0.0 0.0 3 A 1\n",
        );
        let result = parse_str("het", &text, &ParseConfig::capture()).unwrap();
        let mapping = object(&result).mapping("A").unwrap();
        assert_eq!(mapping.get(0).unwrap().het_flag().to_string(), " ");
        assert_eq!(mapping.get(1).unwrap().het_flag().to_string(), "W");
        assert_eq!(mapping.get(2).unwrap().het_flag().to_string(), "H_ZN");
        assert_eq!(object(&result).sequence("A"), Some("AXX"));
    }

    #[test]
    fn parse_is_idempotent() {
        let text = gapped_chain();
        let table: FieldTable = text.parse().unwrap();
        let first = parse_table("idem", &table, &ParseConfig::capture()).unwrap();
        let second = parse_table("idem", &table, &ParseConfig::capture()).unwrap();
        assert_eq!(first.mmcif_object, second.mmcif_object);
        assert_eq!(first.errors.len(), second.errors.len());
    }

    #[test]
    fn parse_extracts_header_and_keeps_raw_table() {
        let result = parse_str("hdr", &complete_chain(), &ParseConfig::capture()).unwrap();
        let object = object(&result);
        assert_eq!(object.header().structure_method, "x-ray diffraction");
        assert_eq!(object.header().release_date.as_deref(), Some("2015-06-03"));
        assert!((object.header().resolution - 1.90).abs() < 1e-9);
        assert_eq!(object.raw_table().first("_entry.id"), Some("TEST"));
    }

    #[test]
    fn parse_captures_tokenizer_failures_as_parse_failures() {
        let text = "data_bad\n_entry.id 'unterminated\n";

        let result = parse_str("bad", text, &ParseConfig::capture()).unwrap();
        assert!(result.mmcif_object.is_none());
        let error = &result.errors[&("bad".to_string(), String::new())];
        assert_eq!(error.kind(), ErrorKind::UnderlyingParseFailure);

        let err = parse_str("bad", text, &ParseConfig::fail_fast()).unwrap_err();
        assert!(matches!(err, Error::Table(_)));
    }

    #[test]
    fn parse_captures_malformed_numbers() {
        let text = entry(
            "1 1 ALA\n",
            "A 1\n",
            "ATOM 1 N N ALA A 1 1 ? 0.0 0.0 0.0 ten A 1\n",
        );
        let result = parse_str("num", &text, &ParseConfig::capture()).unwrap();
        assert_eq!(object(&result).chain_count(), 0);
        assert!(matches!(
            result.errors.get(&("num".to_string(), "A".to_string())),
            Some(Error::MalformedField { .. })
        ));

        let err = parse_str("num", &text, &ParseConfig::fail_fast()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnderlyingParseFailure);
    }

    #[test]
    fn parse_batch_preserves_input_order() {
        let inputs = vec![
            ("first".to_string(), complete_chain()),
            ("second".to_string(), "data_bad\n_a.b 'open\n".to_string()),
            ("third".to_string(), gapped_chain()),
        ];
        let results = parse_batch(&inputs, &ParseConfig::capture());
        assert_eq!(results.len(), 3);

        let ids: Vec<_> = results
            .iter()
            .map(|r| {
                r.as_ref()
                    .unwrap()
                    .mmcif_object
                    .as_ref()
                    .map(|o| o.file_id().to_string())
            })
            .collect();
        assert_eq!(
            ids,
            vec![Some("first".to_string()), None, Some("third".to_string())]
        );
    }

    #[test]
    fn parse_uses_configured_code_table() {
        let config = ParseConfig::capture()
            .with_code_table(CodeTable::from_pairs("lower", [("ALA", "a"), ("GLY", "g")]));
        let result = parse_str("codes", &complete_chain(), &config).unwrap();
        assert_eq!(object(&result).sequence("A"), Some("agX"));
    }
}
