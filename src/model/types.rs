use std::fmt;

/// Residue names that the hetero classification treats as water.
const WATER_NAMES: [&str; 2] = ["HOH", "WAT"];

/// One entry of a chain's authoritative polymer sequence (`_entity_poly_seq`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Monomer {
    /// Chemical component code, e.g. `"MET"`.
    pub id: String,
    /// Ordinal in the file's internal sequence numbering.
    pub num: i32,
}

impl Monomer {
    pub fn new(id: impl Into<String>, num: i32) -> Self {
        Self { id: id.into(), num }
    }
}

/// Hetero classification of an observed residue.
///
/// Renders as `' '` for standard polymer residues, `'W'` for waters, and `'H_<NAME>'` for
/// every other hetero residue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HetFlag {
    Standard,
    Water,
    Hetero(String),
}

impl HetFlag {
    /// Classifies a residue from its record group and component code.
    ///
    /// # Arguments
    ///
    /// * `is_hetatm` - Whether the atom came from a `HETATM` record.
    /// * `residue_name` - Component code of the residue.
    pub fn classify(is_hetatm: bool, residue_name: &str) -> Self {
        if !is_hetatm {
            HetFlag::Standard
        } else if WATER_NAMES.contains(&residue_name) {
            HetFlag::Water
        } else {
            HetFlag::Hetero(residue_name.to_string())
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, HetFlag::Standard)
    }
}

impl fmt::Display for HetFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HetFlag::Standard => f.write_str(" "),
            HetFlag::Water => f.write_str("W"),
            HetFlag::Hetero(name) => write!(f, "H_{name}"),
        }
    }
}

/// Author-facing address of an observed residue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResiduePosition {
    /// Author chain identifier (`auth_asym_id`).
    pub chain_id: String,
    /// Author residue number (`auth_seq_id`).
    pub residue_number: i32,
    /// Insertion code, `' '` when the file leaves it unset.
    pub insertion_code: char,
}

impl ResiduePosition {
    pub fn new(chain_id: impl Into<String>, residue_number: i32, insertion_code: char) -> Self {
        Self {
            chain_id: chain_id.into(),
            residue_number,
            insertion_code,
        }
    }
}

impl fmt::Display for ResiduePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.residue_number)?;
        if self.insertion_code != ' ' {
            write!(f, "{}", self.insertion_code)?;
        }
        Ok(())
    }
}

/// Observation state of one canonical sequence position.
///
/// A residue is missing exactly when it has no structural position; the constructors are the
/// only way to build one, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueAtPosition {
    position: Option<ResiduePosition>,
    name: String,
    het_flag: HetFlag,
}

impl ResidueAtPosition {
    /// A residue that has at least one atom in the first model.
    pub fn observed(position: ResiduePosition, name: impl Into<String>, het_flag: HetFlag) -> Self {
        Self {
            position: Some(position),
            name: name.into(),
            het_flag,
        }
    }

    /// A residue listed in the polymer sequence but absent from the coordinates.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            position: None,
            name: name.into(),
            het_flag: HetFlag::Standard,
        }
    }

    pub fn position(&self) -> Option<&ResiduePosition> {
        self.position.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_missing(&self) -> bool {
        self.position.is_none()
    }

    pub fn het_flag(&self) -> &HetFlag {
        &self.het_flag
    }
}
