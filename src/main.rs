//! Covidash CLI - COVID-19 report pipeline
//!
//! # Main Commands
//!
//! ```bash
//! covidash serve                      # Start HTTP server (port 3000)
//! covidash report worst-affected     # Render a report page to JSON
//! covidash pages                     # List report pages
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! covidash check                     # Verify the four datasets load
//! covidash export daywise            # Dump a loaded table back to CSV
//! ```

use clap::{Parser, Subcommand};
use covidash::{
    export_csv, render, DatasetCache, Dataset, ReportPage, ReportParams,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the data directory, read when `--data-dir`
/// is not given.
const DATA_DIR_ENV: &str = "COVID_DATA_DIR";

#[derive(Parser)]
#[command(name = "covidash")]
#[command(about = "COVID-19 analytics pipeline and report backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server for the dashboard frontend
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Directory containing the four CSV datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Render one report page to JSON
    Report {
        /// Page slug or sidebar label (see `covidash pages`)
        page: String,

        /// WHO region for the region-wise page
        #[arg(long)]
        region: Option<String>,

        /// Country for the daily-trends page
        #[arg(long)]
        country: Option<String>,

        /// Directory containing the four CSV datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the report pages with their parameters
    Pages,

    /// Dump one loaded table back to CSV
    Export {
        /// Dataset slug: countries, time-series, daywise, usa-counties
        dataset: String,

        /// Directory containing the four CSV datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify that all four datasets load
    Check {
        /// Directory containing the four CSV datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, data_dir } => cmd_serve(port, data_dir).await,
        Commands::Report {
            page,
            region,
            country,
            data_dir,
            output,
        } => cmd_report(&page, region, country, data_dir, output.as_deref()),
        Commands::Pages => cmd_pages(),
        Commands::Export {
            dataset,
            data_dir,
            output,
        } => cmd_export(&dataset, data_dir, output.as_deref()),
        Commands::Check { data_dir } => cmd_check(data_dir),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the data directory: flag, then env, then `./data`.
fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

async fn cmd_serve(port: u16, data_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let cache = Arc::new(DatasetCache::new(resolve_data_dir(data_dir)));
    covidash::server::start_server(port, cache).await
}

fn cmd_report(
    page: &str,
    region: Option<String>,
    country: Option<String>,
    data_dir: Option<PathBuf>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = ReportPage::parse(page)
        .ok_or_else(|| format!("unknown report page '{}' (see `covidash pages`)", page))?;

    let cache = DatasetCache::new(resolve_data_dir(data_dir));
    let datasets = cache.get()?;
    let params = ReportParams { region, country };
    let report = render(page, &params, &datasets)?;

    write_output(&serde_json::to_string_pretty(&report)?, output)
}

fn cmd_pages() -> Result<(), Box<dyn std::error::Error>> {
    for page in ReportPage::ALL {
        let parameter = match page.parameter() {
            Some(p) => format!(" (--{})", p.name()),
            None => String::new(),
        };
        println!("{:<18} {}{}", page.slug(), page.label(), parameter);
    }
    Ok(())
}

fn cmd_export(
    dataset: &str,
    data_dir: Option<PathBuf>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Dataset::from_slug(dataset).ok_or_else(|| {
        format!(
            "unknown dataset '{}' (expected one of: countries, time-series, daywise, usa-counties)",
            dataset
        )
    })?;

    let cache = DatasetCache::new(resolve_data_dir(data_dir));
    let datasets = cache.get()?;
    let csv = export_csv(&datasets, dataset)?;

    write_output(&csv, output)
}

fn cmd_check(data_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = resolve_data_dir(data_dir);
    let cache = DatasetCache::new(&dir);
    let datasets = cache.get()?;

    println!("All datasets loaded from {}:", dir.display());
    for dataset in Dataset::ALL {
        println!(
            "   {:<28} {:>7} rows",
            dataset.file_name(),
            datasets.row_count(dataset)
        );
    }
    Ok(())
}

fn write_output(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("Written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
