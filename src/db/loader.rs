use super::schema::CodeTableFile;

const PROTEIN_LETTERS: &str = include_str!("../../tables/protein_letters.toml");

pub fn load_protein_letters() -> CodeTableFile {
    toml::from_str(PROTEIN_LETTERS)
        .unwrap_or_else(|e| panic!("Failed to parse built-in code table: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_table_covers_the_twenty_standard_amino_acids() {
        let file = load_protein_letters();
        let standard = [
            ("ALA", "A"),
            ("ARG", "R"),
            ("ASN", "N"),
            ("ASP", "D"),
            ("CYS", "C"),
            ("GLN", "Q"),
            ("GLU", "E"),
            ("GLY", "G"),
            ("HIS", "H"),
            ("ILE", "I"),
            ("LEU", "L"),
            ("LYS", "K"),
            ("MET", "M"),
            ("PHE", "F"),
            ("PRO", "P"),
            ("SER", "S"),
            ("THR", "T"),
            ("TRP", "W"),
            ("TYR", "Y"),
            ("VAL", "V"),
        ];
        for (code, letter) in standard {
            assert_eq!(file.letters.get(code).map(String::as_str), Some(letter), "{code}");
        }
        assert_eq!(file.info.unknown, 'X');
    }

    #[test]
    fn built_in_table_maps_modified_residues_to_parent_letters() {
        let file = load_protein_letters();
        assert_eq!(file.letters.get("MSE").map(String::as_str), Some("M"));
        assert_eq!(file.letters.get("SEP").map(String::as_str), Some("S"));
        assert_eq!(file.letters.get("5HP").map(String::as_str), Some("E"));
        assert!(!file.letters.contains_key("HOH"));
    }
}
