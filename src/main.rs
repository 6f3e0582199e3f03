//! kobatch CLI - batch upload knowledge objects and metadata
//!
//! # Main Commands
//!
//! ```bash
//! kobatch process resalliance sheet.xlsx   # Normalize a spreadsheet to JSON
//! kobatch upload resalliance --dry-run     # Validate a batch against the API
//! kobatch upload resalliance               # Upload files and commit metadata
//! kobatch check-auth                       # Probe credentials and projects
//! ```

use clap::{Parser, Subcommand};
use kobatch::{
    config::Config, load_source_table, normalize_table, profile, profile_names, run_source,
    ApiClient, BatchReport,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kobatch")]
#[command(about = "Batch upload knowledge objects and metadata to EU-FarmBook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a spreadsheet and output the canonical records as JSON
    Process {
        /// Source profile (resalliance, g4ae)
        source: String,

        /// Input spreadsheet
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload every spreadsheet in the metadata directory
    Upload {
        /// Source profile (resalliance, g4ae)
        source: String,

        /// Validate metadata against remote rules without committing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check credentials: API status and registered projects
    CheckAuth,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            source,
            input,
            output,
        } => cmd_process(&source, &input, output.as_deref()),

        Commands::Upload { source, dry_run } => cmd_upload(&source, dry_run).await,

        Commands::CheckAuth => cmd_check_auth().await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn lookup_profile(name: &str) -> Result<&'static kobatch::SourceProfile, String> {
    profile(name).ok_or_else(|| {
        format!(
            "Unknown source profile '{}'. Available: {}",
            name,
            profile_names().join(", ")
        )
    })
}

fn cmd_process(
    source: &str,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = lookup_profile(source)?;

    eprintln!("📄 Processing: {}", input.display());
    let table = load_source_table(input, profile)?;
    eprintln!("   Columns: {}", table.headers.join(", "));

    let records = normalize_table(&table, profile)?;
    eprintln!("✅ Normalized {} record(s)", records.len());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_upload(source: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profile = lookup_profile(source)?;
    let config = Config::from_env()?;

    eprintln!("🚀 Starting the process...");
    if dry_run {
        eprintln!("   Dry run to check metadata validity in progress...");
    } else {
        eprintln!("   Actual API run in progress...");
    }

    let report = run_source(&config, profile, dry_run).await?;
    print_report(&report);

    eprintln!("✨ Process finished");
    Ok(())
}

fn print_report(report: &BatchReport) {
    eprintln!(
        "\n📊 Results: {} submitted, {} failed",
        report.submitted(),
        report.failed()
    );
    for record in &report.records {
        match &record.outcome {
            kobatch::RecordOutcome::Submitted { remote_id, .. } => {
                eprintln!("   ✅ Row {}: {}", record.row, remote_id);
            }
            kobatch::RecordOutcome::Failed { stage, message } => {
                eprintln!("   ❌ Row {} ({}): {}", record.row, stage, message);
            }
        }
    }
}

async fn cmd_check_auth() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let client = ApiClient::new(&config)?;

    eprintln!("🔎 API status...");
    let status = client.db_status().await?;
    eprintln!("   {}", status);

    eprintln!("🔑 Registered projects...");
    let projects = client.projects().await?;
    println!("{}", serde_json::to_string_pretty(&projects)?);

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
