use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tabmatch::Report;
use tabmatch_core::config::Config;
use tabmatch_core::{Catalog, Searcher, UnitSynonymSource};
use tabmatch_sources::{load_unit_synonyms, CsvSource, TableLoader};

#[derive(Parser)]
#[command(name = "tabmatch", about = "Dictionary-mediated table search")]
struct Cli {
    /// Query in the tabmatch mini-language (`a + b`, `a | b`, `#c`, `>10W`, `1-5`).
    #[arg(default_value = "")]
    query: String,

    /// Dictionary table (CSV with a header row).
    #[arg(long)]
    dictionary: PathBuf,

    /// Description table (CSV with a header row).
    #[arg(long)]
    descriptions: PathBuf,

    /// Unit synonyms as a JSON object of canonical → synonyms.
    #[arg(long)]
    units: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/tabmatch/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV field delimiter.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Skip the dictionary and search the descriptions directly.
    #[arg(long)]
    direct: bool,

    /// Fall back to a direct search when the dictionary yields no hits.
    #[arg(long)]
    fallback: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Write debug logs to /tmp/tabmatch-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/tabmatch-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("tabmatch debug log started, tail -f /tmp/tabmatch-debug.log");
    }

    let config = match &cli.config {
        Some(path) => Config::load(Some(path.as_path()))
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load(None).unwrap_or_else(|_| Config::defaults()),
    };

    let delimiter =
        u8::try_from(cli.delimiter).context("delimiter must be a single-byte character")?;
    let dictionary = CsvSource::new(&cli.dictionary).delimiter(delimiter).load()?;
    let descriptions = CsvSource::new(&cli.descriptions).delimiter(delimiter).load()?;

    let file_units;
    let units: &dyn UnitSynonymSource = match &cli.units {
        Some(path) => {
            file_units = load_unit_synonyms(path)?;
            &file_units
        }
        None => &config,
    };

    let mut catalog = Catalog::default();
    catalog.load_dictionary(dictionary, units);
    catalog.load_descriptions(descriptions);
    let snapshot = catalog.snapshot();

    let mut search = config.search;
    if cli.direct {
        search.via_dictionary = false;
    }
    if cli.fallback {
        search.direct_fallback = true;
    }

    let columns = config.columns();
    let response = Searcher::new(&snapshot, &columns).run(&cli.query, &search);
    let report = Report::new(&cli.query, &response, &snapshot.descriptions);

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }

    Ok(if report.is_error() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}
