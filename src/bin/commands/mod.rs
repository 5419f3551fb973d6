use std::fs;
use std::io::{self as stdio, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

use seqres_forge::CodeTable;
use seqres_forge::ops::{ParseConfig, ParsingResult, parse_batch};

pub mod info;
pub mod seqres;

/// File id used when the entry is read from stdin.
pub const STDIN_FILE_ID: &str = "stdin";

/// Aggregated parameters shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunParameters {
    pub inputs: Vec<PathBuf>,
    pub strict: bool,
    pub code_table: Option<PathBuf>,
}

/// Installs the global logger, honoring `RUST_LOG` when set.
pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Reads every configured input into `(file_id, text)` pairs.
pub fn load_inputs(params: &RunParameters) -> Result<Vec<(String, String)>> {
    if params.inputs.is_empty() {
        let mut stdin = stdio::stdin();
        if stdin.is_terminal() {
            bail!(
                "No --input provided and stdin is a TTY. Provide -i/--input or pipe an mmCIF file into seqres-forge."
            );
        }
        let mut text = String::new();
        stdin
            .read_to_string(&mut text)
            .context("Failed to read mmCIF input from stdin")?;
        return Ok(vec![(STDIN_FILE_ID.to_string(), text)]);
    }

    let progress = reading_progress(params.inputs.len());
    let mut entries = Vec::with_capacity(params.inputs.len());
    for path in &params.inputs {
        progress.set_message(path.display().to_string());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?;
        entries.push((file_id_for(path), text));
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(entries)
}

/// Builds the parse configuration from the command-line flags.
pub fn build_config(params: &RunParameters) -> Result<ParseConfig> {
    let mut config = if params.strict {
        ParseConfig::fail_fast()
    } else {
        ParseConfig::capture()
    };

    if let Some(path) = &params.code_table {
        let table = CodeTable::from_toml_path(path)
            .with_context(|| format!("Failed to load code table {}", path.display()))?;
        config = config.with_code_table(table);
    }

    Ok(config)
}

/// Parses every entry, failing on the first fault when the configuration is fail-fast.
pub fn parse_entries(
    entries: &[(String, String)],
    config: &ParseConfig,
) -> Result<Vec<(String, ParsingResult)>> {
    let message = format!("Reconciling {} entries", entries.len());
    let results = run_with_spinner(&message, || Ok(parse_batch(entries, config)))?;

    entries
        .iter()
        .zip(results)
        .map(|((file_id, _), result)| {
            let result = result.with_context(|| format!("Failed to reconcile {file_id}"))?;
            Ok((file_id.clone(), result))
        })
        .collect()
}

/// Derives a file id from a path: the file name up to its first dot.
pub fn file_id_for(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn reading_progress(len: usize) -> ProgressBar {
    if len < 2 || !stdio::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{bar:30.green} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = if stdio::stderr().is_terminal() {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_and_clear(),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_strips_every_extension() {
        assert_eq!(file_id_for(Path::new("/data/1abc.cif.gz")), "1abc");
        assert_eq!(file_id_for(Path::new("2xyz.cif")), "2xyz");
        assert_eq!(file_id_for(Path::new("entry")), "entry");
    }
}
