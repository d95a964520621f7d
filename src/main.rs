//! chemtab CLI - validate CAS registry numbers and enrich chemical tables.

use anyhow::{Context, Result};
use chemtab::{
    Config, EnrichOptions, Enricher, EnrichmentState, ProgressStore, Table, TableLookup,
    find_invalid, validate,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "chemtab")]
#[command(version)]
#[command(about = "CAS Registry Number validation and resumable enrichment for chemical datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults are used when it is absent)
    #[arg(short, long, global = true, default_value = "chemtab.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate CAS registry numbers given on the command line
    Check {
        /// Candidate numbers, e.g. 7732-18-5
        numbers: Vec<String>,
    },

    /// Screen a CSV table for invalid CAS registry numbers
    Validate {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Name of the column holding the CAS numbers
        #[arg(long)]
        column: String,

        /// Write the invalid rows to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the screening report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Enrich a CSV table with values looked up from a reference CSV
    Enrich {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Column holding the lookup keys
        #[arg(short, long)]
        key_column: String,

        /// Name of the column to create with the results
        #[arg(long)]
        column: String,

        /// Reference CSV with key/value pairs
        #[arg(short, long)]
        source: PathBuf,

        /// Key column in the reference CSV
        #[arg(long, default_value = "key")]
        source_key: String,

        /// Value column in the reference CSV
        #[arg(long, default_value = "value")]
        source_value: String,

        /// Output CSV file; also the resume artifact
        #[arg(short, long)]
        output: PathBuf,

        /// Resume from the existing output file instead of starting fresh
        #[arg(long)]
        resume: bool,
    },

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# chemtab configuration file

[lookup]
# Per-call timeout in seconds; a timeout counts as a transient failure
timeout_secs = 20
# Maximum attempts per row before the row is left pending
max_retries = 3
# Minimum delay between lookup calls in milliseconds
request_delay_ms = 2000
# Key normalization before matching: "exact", "trimmed" or "caseless"
normalization = "trimmed"

[enrich]
# Persist progress after this many newly settled rows
persist_every = 1
"#;
    println!("{example}");
}

fn load_config(path: &PathBuf) -> Result<Config> {
    if path.exists() {
        Config::from_file(path).with_context(|| format!("Failed to load config from {path:?}"))
    } else {
        Ok(Config::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
            return Ok(());
        }

        Commands::Check { numbers } => {
            let mut invalid = 0usize;
            for number in &numbers {
                let validity = validate(number.trim());
                if !validity.is_valid() {
                    invalid += 1;
                }
                println!("{number}  {validity}");
            }
            if invalid > 0 {
                println!("\n{invalid} of {} invalid", numbers.len());
            }
        }

        Commands::Validate {
            input,
            column,
            output,
            json,
        } => {
            let table = Table::read_csv(&input)
                .with_context(|| format!("Failed to read input table {input:?}"))?;

            let screening = find_invalid(&table, &column)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&screening)?);
            } else if screening.all_valid() {
                println!("All {} CAS numbers are valid", screening.total);
            } else {
                println!("\n=== Screening Complete ===");
                println!("Rows:              {}", screening.total);
                println!("Valid:             {}", screening.valid);
                println!("Invalid format:    {}", screening.invalid_format);
                println!("Invalid checksum:  {}", screening.invalid_checksum);
                for finding in &screening.findings {
                    println!(
                        "  row {}: {:?} is {}",
                        finding.row + 1,
                        finding.identifier,
                        finding.validity
                    );
                }
            }

            if let Some(output) = output {
                screening
                    .invalid_rows
                    .write_csv(&output)
                    .with_context(|| format!("Failed to write invalid rows to {output:?}"))?;
                info!(rows = screening.invalid_rows.len(), output = %output.display(), "Wrote invalid rows");
            }
        }

        Commands::Enrich {
            input,
            key_column,
            column,
            source,
            source_key,
            source_value,
            output,
            resume,
        } => {
            let config = load_config(&cli.config)?;

            let table = Table::read_csv(&input)
                .with_context(|| format!("Failed to read input table {input:?}"))?;

            let lookup = TableLookup::from_csv(
                &source,
                &source_key,
                &source_value,
                config.lookup.normalization,
            )
            .with_context(|| format!("Failed to load reference table {source:?}"))?;

            let store = ProgressStore::new(&output);
            let prior = if resume {
                match store.load()? {
                    Some(prev) => {
                        let state = EnrichmentState::from_table(
                            &prev,
                            &key_column,
                            &column,
                            config.lookup.normalization,
                        )?;
                        let counts = state.counts();
                        info!(
                            resolved = counts.resolved,
                            not_found = counts.not_found,
                            failed = counts.failed,
                            "Resuming from prior output"
                        );
                        state
                    }
                    None => EnrichmentState::new(),
                }
            } else {
                EnrichmentState::new()
            };

            let options = EnrichOptions {
                key_column,
                value_column: column,
            };

            let mut enricher = Enricher::new(&lookup, &config);
            let outcome = enricher.run(&table, &options, prior, Some(&store)).await?;

            println!("\n=== Enrichment Complete ===");
            println!(
                "Started:      {}",
                outcome.stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Rows:         {}", outcome.stats.total_rows);
            println!("Reused:       {}", outcome.stats.reused);
            println!("Resolved:     {}", outcome.stats.resolved);
            println!("Not found:    {}", outcome.stats.not_found);
            println!("Failed:       {}", outcome.stats.failed);
            println!("Pending:      {}", outcome.stats.unresolved);
            println!("Lookup calls: {}", outcome.stats.lookup_calls);
            println!("Runtime:      {:.1}s", outcome.stats.runtime_secs);
            println!("Output:       {output:?}");
        }
    }

    Ok(())
}
