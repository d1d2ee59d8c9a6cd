use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use wikical::{ics, normalize, wiki};

#[derive(Parser)]
#[command(name = "wikical")]
#[command(about = "Export events from the wiki's event query to an iCalendar file")]
struct Cli {
    /// Path to write the .ics file to (overwritten if it exists)
    output: PathBuf,

    /// Event query URL
    #[arg(long, default_value = wiki::DEFAULT_QUERY_URL)]
    url: String,

    /// UTC offset of the wiki's local time, in seconds. Wiki timestamps are
    /// stored in local time; the default is CET standard time.
    #[arg(long, default_value_t = 3600)]
    utc_offset: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = reqwest::Client::new();
    let response = wiki::fetch(&client, &cli.url).await?;
    println!("Fetched {} pages", response.results.len());

    let events = normalize::normalize_events(&response, cli.utc_offset);
    println!("Exporting {} events", events.len());

    let calendar = ics::generate_calendar(&events);
    std::fs::write(&cli.output, calendar)?;
    println!("Wrote {}", cli.output.display());

    Ok(())
}
