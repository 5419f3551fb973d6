//! Residue code to one-letter sequence translation.
//!
//! A [`CodeTable`] is an immutable value handed to the sequence builder, so alternate tables
//! (nucleic-acid letters, project-specific modified residues) can be swapped in per call
//! without touching shared state.

use crate::db::{self, CodeTableFile};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Sentinel emitted for residues the table cannot translate.
pub const UNKNOWN_RESIDUE: char = 'X';

/// Failure to load a custom code table.
#[derive(Debug, Error)]
pub enum CodeTableError {
    #[error("failed to read code table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid code table: {0}")]
    Format(#[from] toml::de::Error),
}

/// Immutable mapping from residue component codes to sequence letters.
///
/// Letters are stored as strings because external tables occasionally map a code to more
/// than one character; such entries translate to the unknown sentinel.
#[derive(Debug, Clone)]
pub struct CodeTable {
    name: String,
    letters: Arc<HashMap<String, String>>,
    unknown: char,
}

impl CodeTable {
    /// Returns the built-in protein table.
    pub fn protein() -> Self {
        Self::from_file(db::protein_letters().clone())
    }

    /// Builds a table from explicit `(code, letter)` pairs.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            letters: Arc::new(
                pairs
                    .into_iter()
                    .map(|(code, letter)| (code.into(), letter.into()))
                    .collect(),
            ),
            unknown: UNKNOWN_RESIDUE,
        }
    }

    /// Parses a table from TOML text with an `[info]` header and a `[letters]` map.
    ///
    /// # Errors
    ///
    /// Returns [`CodeTableError::Format`] when the text is not valid TOML or carries
    /// unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, CodeTableError> {
        let file: CodeTableFile = toml::from_str(text)?;
        Ok(Self::from_file(file))
    }

    /// Reads and parses a TOML table from disk.
    pub fn from_toml_path(path: &Path) -> Result<Self, CodeTableError> {
        let text = std::fs::read_to_string(path).map_err(|source| CodeTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn from_file(file: CodeTableFile) -> Self {
        Self {
            name: file.info.name,
            letters: Arc::new(file.letters.into_iter().collect()),
            unknown: file.info.unknown,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Translates one residue code, falling back to the unknown sentinel for unlisted codes
    /// and for entries that are not exactly one character long.
    pub fn letter(&self, code: &str) -> char {
        let Some(letter) = self.letters.get(code) else {
            return self.unknown;
        };
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => self.unknown,
        }
    }

    /// Translates a sequence of residue codes into a one-letter string.
    pub fn translate<'a, I>(&self, codes: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes.into_iter().map(|code| self.letter(code)).collect()
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::protein()
    }
}
