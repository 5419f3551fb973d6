use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod commands;

use commands::RunParameters;
use commands::{info, seqres};

#[derive(Parser, Debug)]
#[command(
    name = "seqres-forge",
    about = "Reconcile mmCIF polymer sequences with the residues resolved in the first model.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Input mmCIF file. Repeat for batches. When omitted, stdin is used.
    #[arg(short, long = "input", value_name = "FILE", global = true)]
    inputs: Vec<PathBuf>,
    /// Stop at the first fault instead of reporting it alongside partial results.
    #[arg(long, global = true)]
    strict: bool,
    /// TOML residue code table replacing the built-in protein table.
    #[arg(long, value_name = "FILE", global = true)]
    code_table: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize chains, header metadata, and captured faults per entry.
    Info(info::InfoArgs),
    /// Emit the reconciled chain sequences as FASTA.
    Seqres(seqres::SeqresArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::init_logger(cli.verbose);

    let params = RunParameters {
        inputs: cli.inputs,
        strict: cli.strict,
        code_table: cli.code_table,
    };

    let entries = commands::load_inputs(&params)?;
    let config = commands::build_config(&params)?;
    let results = commands::parse_entries(&entries, &config)?;

    match cli.command {
        Command::Info(args) => info::run(&results, &args)?,
        Command::Seqres(args) => seqres::run(&results, &args)?,
    }

    Ok(())
}
