use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use seqres_forge::MmcifObject;
use seqres_forge::ops::ParsingResult;

/// Report-only command that summarizes every reconciled entry.
#[derive(Debug, Default, Args)]
pub struct InfoArgs {
    /// Also list the canonical indices of missing residues per chain.
    #[arg(long)]
    pub gaps: bool,
}

/// Prints header metadata, chain statistics, and captured faults for each entry.
pub fn run(results: &[(String, ParsingResult)], args: &InfoArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();

    for (file_id, result) in results {
        print_boxed_label(&mut stdout, &format!("Entry {file_id}"))?;
        writeln!(&mut stdout)?;

        match &result.mmcif_object {
            Some(object) => {
                print_header(&mut stdout, object)?;
                print_chains(&mut stdout, object, args.gaps)?;
            }
            None => writeln!(&mut stdout, "No reconciled chains.")?,
        }

        if !result.errors.is_empty() {
            print_errors(&mut stdout, result)?;
        }
        writeln!(&mut stdout)?;
    }

    stdout.flush().context("Failed to flush stdout")
}

fn print_header<W: Write>(writer: &mut W, object: &MmcifObject) -> Result<()> {
    let header = object.header();
    let method = match header.structure_method.as_str() {
        "" => "unknown",
        method => method,
    };
    let release_date = header.release_date.as_deref().unwrap_or("unknown");

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Method", method]);
    table.add_row(row!["Release Date", release_date]);
    table.add_row(row!["Resolution (Å)", format!("{:.2}", header.resolution)]);
    table
        .print(writer)
        .context("Failed to render header summary")?;
    writeln!(writer)?;
    Ok(())
}

fn print_chains<W: Write>(writer: &mut W, object: &MmcifObject, gaps: bool) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    if gaps {
        table.set_titles(row!["Chain", "Length", "Observed", "Missing", "Gaps"]);
    } else {
        table.set_titles(row!["Chain", "Length", "Observed", "Missing"]);
    }

    for (chain_id, mapping) in object.seqres_to_structure() {
        if gaps {
            table.add_row(row![
                chain_id,
                mapping.len(),
                mapping.observed_count(),
                mapping.missing_count(),
                format_ranges(&mapping.missing_indices())
            ]);
        } else {
            table.add_row(row![
                chain_id,
                mapping.len(),
                mapping.observed_count(),
                mapping.missing_count()
            ]);
        }
    }

    table
        .print(writer)
        .context("Failed to render chain summary")?;
    writeln!(writer)?;
    Ok(())
}

fn print_errors<W: Write>(writer: &mut W, result: &ParsingResult) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Chain", "Kind", "Message"]);
    for ((_, chain_id), error) in &result.errors {
        let scope = if chain_id.is_empty() { "-" } else { chain_id };
        table.add_row(row![scope, error.kind(), error]);
    }
    table
        .print(writer)
        .context("Failed to render fault summary")?;
    Ok(())
}

/// Collapses sorted indices into `a-b` runs.
fn format_ranges(indices: &[usize]) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut iter = indices.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        runs.push(if start == end {
            start.to_string()
        } else {
            format!("{start}-{end}")
        });
    }
    if runs.is_empty() {
        "-".to_string()
    } else {
        runs.join(", ")
    }
}

fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}
