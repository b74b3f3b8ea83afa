//! Remessa CLI
//!
//! Generates Bradesco Multipag remittance files from a payment sheet,
//! audits existing files and writes the sheet template.

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use remessa_core::input::{read_rows, template_csv};
use remessa_core::inspect::inspect;
use remessa_core::state::SequenceStore;
use remessa_core::validation::validate_rows;
use remessa_core::{Config, FileAssembler};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "remessa", version, about = "Bradesco Multipag CNAB 240 remittance generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a remittance file from a payment sheet (CSV)
    Generate {
        /// Payment sheet
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// TOML configuration; defaults plus REMESSA_* variables when absent
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Output directory, overrides the configuration
        #[arg(short = 'o', long = "output-dir")]
        output_dir: Option<PathBuf>,

        /// Use this NSA instead of the state file; the state file is left alone
        #[arg(long = "nsa")]
        nsa: Option<u32>,

        /// Validate and report without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Print the generation summary as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Audit the structure of a remittance file
    Inspect {
        /// Remittance file
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Write the payment sheet template
    Template {
        /// Destination file (stdout when absent)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            input,
            config,
            output_dir,
            nsa,
            dry_run,
            json,
        } => generate(input, config, output_dir, nsa, dry_run, json),
        Command::Inspect { file, json } => inspect_file(file, json),
        Command::Template { output } => template(output),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            let mut config = Config::from_file(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            config.apply_env_overrides()?;
            config
        }
        None => {
            info!("Loading config from environment variables");
            Config::from_env()?
        }
    };
    config.validate()?;
    Ok(config)
}

fn generate(
    input: PathBuf,
    config: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    nsa: Option<u32>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config)?;
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }

    let sheet = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
    let rows = read_rows(sheet)?;
    let (instructions, report) = validate_rows(&rows, Local::now().date_naive());

    for warning in &report.warnings {
        warn!("line {}: {}", warning.line, warning.message);
    }
    if report.has_errors() {
        for error in &report.errors {
            eprintln!("line {}: [{}] {}", error.line, error.code, error.message);
        }
        bail!(
            "{} row(s) rejected, no file generated",
            report.errors.len()
        );
    }
    if instructions.is_empty() {
        bail!("no payment rows in {}", input.display());
    }

    let mut store = SequenceStore::load(&config.output.state_file)?;
    let file_sequence = nsa.unwrap_or_else(|| store.current());

    let generated = FileAssembler::new(&config.payer, file_sequence).generate(&instructions);
    let path = config.output.dir.join(generated.file_name());

    if json {
        println!("{}", serde_json::to_string_pretty(&generated.summary)?);
    } else {
        for batch in &generated.summary.batches {
            println!(
                "batch {} {:<16} {:>4} payments  R$ {}",
                batch.sequence,
                batch.method.to_string(),
                batch.ordinals.len(),
                batch.total_amount()
            );
        }
        println!(
            "{} payments, R$ {}, {} records",
            generated.summary.instruction_count(),
            generated.summary.total_amount(),
            generated.summary.total_records
        );
    }

    if dry_run {
        info!("Dry run: {} not written", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("creating {}", config.output.dir.display()))?;
    std::fs::write(&path, &generated.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), generated.bytes.len());

    if nsa.is_none() {
        store.commit_after_success(file_sequence)?;
    }

    println!("{}", path.display());
    Ok(())
}

fn inspect_file(file: PathBuf, json: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let report = inspect(&bytes);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} records, {} batches", report.records, report.batches.len());
        for batch in &report.batches {
            println!(
                "batch {} form {}: {} segment A, {} segment B, {} cents",
                batch.sequence, batch.settlement_form, batch.segment_a, batch.segment_b, batch.total_cents
            );
        }
    }

    report.into_result()?;
    Ok(())
}

fn template(output: Option<PathBuf>) -> anyhow::Result<()> {
    let csv = template_csv()?;
    match output {
        Some(path) => {
            std::fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
            info!("Template written to {}", path.display());
        }
        None => io::stdout().write_all(csv.as_bytes())?,
    }
    Ok(())
}
