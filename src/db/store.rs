use super::loader;
use super::schema::CodeTableFile;
use std::sync::OnceLock;

static PROTEIN_LETTERS: OnceLock<CodeTableFile> = OnceLock::new();

pub fn protein_letters() -> &'static CodeTableFile {
    PROTEIN_LETTERS.get_or_init(loader::load_protein_letters)
}
