use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CodeTableFile {
    pub info: CodeTableInfo,
    #[serde(default)]
    pub letters: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CodeTableInfo {
    pub name: String,
    #[serde(default = "default_unknown")]
    pub unknown: char,
}

fn default_unknown() -> char {
    'X'
}
