use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use seqres_forge::ops::ParsingResult;

/// Writes reconciled chain sequences in FASTA format.
#[derive(Debug, Default, Args)]
pub struct SeqresArgs {
    /// Output file path. When omitted, stdout is used.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Wrap sequence lines at this many residues; 0 disables wrapping.
    #[arg(long, default_value_t = 0)]
    pub width: usize,
}

pub fn run(results: &[(String, ParsingResult)], args: &SeqresArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_fasta(&mut writer, results, args.width)
                .with_context(|| format!("Failed to write FASTA to {}", path.display()))?;
            writer.flush().context("Failed to flush output writer")?;
        }
        None => {
            let mut writer = BufWriter::new(io::stdout().lock());
            write_fasta(&mut writer, results, args.width)
                .context("Failed to write FASTA to stdout")?;
            writer.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

/// Emits one `>file_id_chain` record per reconciled chain, in chain id order.
fn write_fasta<W: Write>(
    writer: &mut W,
    results: &[(String, ParsingResult)],
    width: usize,
) -> io::Result<()> {
    for (file_id, result) in results {
        let Some(object) = &result.mmcif_object else {
            continue;
        };
        for (chain_id, sequence) in object.chain_to_seqres() {
            writeln!(writer, ">{file_id}_{chain_id}")?;
            if width == 0 || sequence.is_empty() {
                writeln!(writer, "{sequence}")?;
            } else {
                let letters: Vec<char> = sequence.chars().collect();
                for line in letters.chunks(width) {
                    writeln!(writer, "{}", line.iter().collect::<String>())?;
                }
            }
        }
    }
    Ok(())
}
