//! Key-to-column view of a parsed mmCIF data block.
//!
//! Every data item is stored as a list of strings: scalar items hold a single value and
//! `loop_` columns hold one value per row, positionally aligned with the other columns of the
//! same category. Reconciliation code only ever reads through this type and never inspects
//! the raw text.

use super::error::Error;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Placeholder values used by mmCIF for "not applicable" (`.`) and "unknown" (`?`).
const UNSET_MARKERS: [&str; 2] = [".", "?"];

/// Returns `true` when `value` carries data rather than one of the mmCIF unset markers.
pub fn is_set(value: &str) -> bool {
    !UNSET_MARKERS.contains(&value)
}

/// Parsed field table for a single mmCIF data block.
///
/// Keys keep the exact spelling found in the file (`_atom_site.label_asym_id`), and values
/// are owned so tables can outlive the text they were read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTable {
    block_name: Option<String>,
    fields: BTreeMap<String, Vec<String>>,
}

/// A single row of a `loop_` category, addressed by full item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopRow<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> LoopRow<'a> {
    /// Looks up the value of `key` (for example `_struct_asym.id`) in this row.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied()
    }
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name following `data_` in the block header, if the text had one.
    pub fn block_name(&self) -> Option<&str> {
        self.block_name.as_deref()
    }

    pub fn set_block_name(&mut self, name: impl Into<String>) {
        self.block_name = Some(name.into());
    }

    /// Inserts or replaces a whole column.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.fields.insert(key.into(), values);
    }

    /// Appends one value to a column, creating the column on first use.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        match self.fields.get_mut(key) {
            Some(column) => column.push(value.into()),
            None => {
                self.fields.insert(key.to_string(), vec![value.into()]);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// First value of `key`, the natural accessor for scalar items.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Collects the rows of every column whose key starts with `prefix`.
    ///
    /// Columns are zipped positionally; when their lengths disagree the shortest column
    /// bounds the number of rows.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Category prefix including the trailing dot, e.g. `"_entity_poly_seq."`.
    ///
    /// # Returns
    ///
    /// Rows in file order. An absent category yields an empty vector.
    pub fn loop_rows(&self, prefix: &str) -> Vec<LoopRow<'_>> {
        let columns: Vec<(&str, &[String])> = self
            .fields
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, values)| (key.as_str(), values.as_slice()))
            .collect();

        let row_count = columns
            .iter()
            .map(|(_, values)| values.len())
            .min()
            .unwrap_or(0);

        (0..row_count)
            .map(|row| LoopRow {
                values: columns
                    .iter()
                    .map(|(key, values)| (*key, values[row].as_str()))
                    .collect(),
            })
            .collect()
    }

    /// Indexes the rows of a category by the value of one of its columns.
    ///
    /// Later rows sharing an index value replace earlier ones.
    pub fn loop_to_map(&self, prefix: &str, index_key: &str) -> HashMap<&str, LoopRow<'_>> {
        self.loop_rows(prefix)
            .into_iter()
            .filter_map(|row| row.get(index_key).map(|id| (id, row)))
            .collect()
    }
}

impl FromStr for FieldTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::mmcif::reader::read(s.as_bytes())
    }
}
