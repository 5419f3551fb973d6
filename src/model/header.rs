//! Entry-level metadata lifted from the field table.

use crate::io::FieldTable;
use log::{debug, warn};

/// Resolution items in order of preference.
const RESOLUTION_KEYS: [&str; 3] = [
    "_refine.ls_d_res_high",
    "_em_3d_reconstruction.resolution",
    "_reflns.d_resolution_high",
];

/// Experimental method, release date, and resolution of an entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MmcifHeader {
    /// Lowercased `_exptl.method` values joined with commas.
    pub structure_method: String,
    /// Earliest revision date (`YYYY-MM-DD`), when the file records revisions.
    pub release_date: Option<String>,
    /// Resolution in ångström; `0.0` when none of the resolution items parse.
    pub resolution: f64,
}

impl MmcifHeader {
    /// Extracts the header fields from a parsed table.
    ///
    /// Missing items are tolerated: an absent revision history leaves `release_date` unset
    /// and unparseable resolutions are skipped in favor of the next candidate.
    pub fn from_table(table: &FieldTable) -> Self {
        let structure_method = table
            .loop_rows("_exptl.")
            .iter()
            .filter_map(|row| row.get("_exptl.method"))
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(",");

        let release_date = table
            .get("_pdbx_audit_revision_history.revision_date")
            .and_then(|dates| dates.iter().min().cloned());
        if release_date.is_none() {
            warn!(
                "could not determine release date for entry {}",
                table.first("_entry.id").unwrap_or("?")
            );
        }

        let mut resolution = 0.0;
        for key in RESOLUTION_KEYS {
            let Some(raw) = table.first(key) else {
                continue;
            };
            match raw.parse::<f64>() {
                Ok(value) => {
                    resolution = value;
                    break;
                }
                Err(_) => debug!("invalid resolution format for {key}: '{raw}'"),
            }
        }

        Self {
            structure_method,
            release_date,
            resolution,
        }
    }
}
