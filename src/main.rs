//! FinCast CLI - Transform raw financial records into analysis-ready tables
//!
//! # Main Commands
//!
//! ```bash
//! fincast run input.csv              # Full pipeline: extract + transform + stage
//! fincast transform input.json      # Transform, write tables to stdout/files
//! fincast fetch AAPL MSFT           # Pull statements from Alpha Vantage
//! fincast serve                     # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! fincast extract input.csv         # Just parse a source into raw records
//! fincast schema                    # Print the persisted-table DDL
//! ```

use clap::{Parser, Subcommand};
use fincast::pipeline::{run_file, PipelineOptions};
use fincast::{
    extract_file_auto, load, schema_ddl, AlphaVantageClient, TransformConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fincast")]
#[command(about = "Transform raw financial records into analysis-ready tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a source file (CSV/JSON) and output unified raw records
    Extract {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform a source file into the Standard and Category tables
    Transform {
        /// Input file (CSV or JSON)
        input: PathBuf,

        /// Classification config JSON (sectors + thresholds)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the Standard Table JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the Category Table JSON
        #[arg(long)]
        category_output: Option<PathBuf>,
    },

    /// Full pipeline: extract, transform, write staged CSV/JSON tables
    Run {
        /// Input file (CSV or JSON)
        input: PathBuf,

        /// Staged output directory
        #[arg(short, long, default_value = "data/staged")]
        staged_dir: PathBuf,

        /// Classification config JSON (sectors + thresholds)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Fetch financial statements from Alpha Vantage into raw JSON
    Fetch {
        /// Symbols to fetch (default: AAPL MSFT GOOGL AMZN TSLA)
        symbols: Vec<String>,

        /// Output file (default: data/raw/financial_data_raw.json)
        #[arg(short, long, default_value = "data/raw/financial_data_raw.json")]
        output: PathBuf,
    },

    /// Print the persisted-schema DDL for both tables
    Schema,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract { input, output } => cmd_extract(&input, output.as_deref()),

        Commands::Transform {
            input,
            config,
            output,
            category_output,
        } => cmd_transform(
            &input,
            config.as_deref(),
            output.as_deref(),
            category_output.as_deref(),
        ),

        Commands::Run {
            input,
            staged_dir,
            config,
        } => cmd_run(&input, &staged_dir, config.as_deref()),

        Commands::Fetch { symbols, output } => cmd_fetch(symbols, &output).await,

        Commands::Schema => cmd_schema(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing source: {}", input.display());

    let result = extract_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    if !result.headers.is_empty() {
        eprintln!(
            "   Delimiter: '{}'",
            format_delimiter(result.delimiter)
        );
        eprintln!("   Columns: {}", result.headers.join(", "));
    }
    eprintln!("Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_transform(
    input: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    category_output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Processing: {}", input.display());

    let options = load_options(config)?;
    let result = run_file(input, options)?;

    eprintln!(
        "Transformed {} records into {} + {} rows",
        result.source.row_count,
        result.standard.len(),
        result.category.len()
    );

    let standard_json = serde_json::to_string_pretty(&result.standard)?;
    write_output(&standard_json, output)?;

    if let Some(category_path) = category_output {
        let category_json = serde_json::to_string_pretty(&result.category)?;
        fs::write(category_path, &category_json)?;
        eprintln!("Category table written to: {}", category_path.display());
    }

    Ok(())
}

fn cmd_run(
    input: &Path,
    staged_dir: &Path,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Processing: {}", input.display());

    let options = load_options(config)?;
    let result = run_file(input, options)?;

    let paths = load::write_staged(&result.standard, &result.category, staged_dir)?;
    eprintln!("Standard table (for ML/SVR) saved to {}", paths.standard.display());
    eprintln!("Category table (for LLM) saved to {}", paths.category.display());

    // Per-run data-quality report
    eprintln!("\nRun summary:");
    eprintln!("   Rows:             {}", result.summary.rows_in);
    eprintln!("   Nulled fields:    {}", result.summary.total_nulled());
    eprintln!(
        "   Unmapped tickers: {}",
        if result.summary.unmapped_tickers.is_empty() {
            "none".to_string()
        } else {
            result
                .summary
                .unmapped_tickers
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    Ok(())
}

async fn cmd_fetch(
    symbols: Vec<String>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    use fincast::extract::api::DEFAULT_SYMBOLS;

    let client = AlphaVantageClient::from_env()?;

    let symbols: Vec<&str> = if symbols.is_empty() {
        DEFAULT_SYMBOLS.to_vec()
    } else {
        symbols.iter().map(String::as_str).collect()
    };

    let records = client.fetch_symbols(&symbols).await?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(output, json)?;
    eprintln!("Saved {} records to {}", records.len(), output.display());

    Ok(())
}

fn cmd_schema() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", schema_ddl());
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    fincast::server::start_server(port).await
}

fn load_options(config: Option<&Path>) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
    Ok(match config {
        Some(path) => {
            eprintln!("Using config: {}", path.display());
            PipelineOptions::with_config(TransformConfig::from_file(path)?)
        }
        None => PipelineOptions::default(),
    })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
