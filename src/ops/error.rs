use std::fmt;
use thiserror::Error;

/// Coarse classification of reconciliation faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No chain in the entry is a protein polymer; nothing can be reconciled.
    NoPolymerChainsFound,
    /// A polymer chain never appears in the first model, so it has no author chain id.
    UnresolvedChainIdentity,
    /// The text could not be read, or the table held data the pipeline cannot interpret.
    UnderlyingParseFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NoPolymerChainsFound => "no polymer chains found",
            ErrorKind::UnresolvedChainIdentity => "unresolved chain identity",
            ErrorKind::UnderlyingParseFailure => "underlying parse failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no protein chains found in this file")]
    NoPolymerChainsFound,

    #[error("chain '{chain_id}' has no atoms in the first model and cannot be mapped to an author chain id")]
    UnresolvedChainIdentity { chain_id: String },

    #[error(transparent)]
    Table(#[from] crate::io::Error),

    #[error("required mmCIF item '{field}' is missing")]
    MissingField { field: String },

    #[error("malformed value '{value}' for '{field}' (row {row})")]
    MalformedField {
        field: String,
        value: String,
        row: usize,
    },

    #[error(
        "sequence number {seq_num} of chain '{chain_id}' falls outside its {length}-residue polymer sequence"
    )]
    SequenceIndexOutOfRange {
        chain_id: String,
        seq_num: i32,
        length: usize,
    },
}

impl Error {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn malformed_field(field: impl Into<String>, value: impl Into<String>, row: usize) -> Self {
        Self::MalformedField {
            field: field.into(),
            value: value.into(),
            row,
        }
    }

    pub fn unresolved_chain(chain_id: impl Into<String>) -> Self {
        Self::UnresolvedChainIdentity {
            chain_id: chain_id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoPolymerChainsFound => ErrorKind::NoPolymerChainsFound,
            Error::UnresolvedChainIdentity { .. } => ErrorKind::UnresolvedChainIdentity,
            Error::Table(_)
            | Error::MissingField { .. }
            | Error::MalformedField { .. }
            | Error::SequenceIndexOutOfRange { .. } => ErrorKind::UnderlyingParseFailure,
        }
    }

    /// Whether the fault concerns a single chain rather than the whole entry.
    ///
    /// Malformed `_atom_site` values belong to the chain of their atom; malformed values of
    /// any other category fail the whole entry.
    pub fn is_chain_scoped(&self) -> bool {
        match self {
            Error::UnresolvedChainIdentity { .. } | Error::SequenceIndexOutOfRange { .. } => true,
            Error::MalformedField { field, .. } => field.starts_with("_atom_site."),
            Error::NoPolymerChainsFound | Error::Table(_) | Error::MissingField { .. } => false,
        }
    }
}
