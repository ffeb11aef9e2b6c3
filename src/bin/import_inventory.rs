use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use uquake_inventory::config::InventoryConfig;
use uquake_inventory::importers::SpreadsheetImporter;
use uquake_inventory::response::{InMemoryResponseLibrary, NoResponseLibrary, ResponseLibrary};

#[derive(Parser)]
#[command(name = "import-inventory")]
#[command(about = "Build a StationXML inventory from a site workbook", long_about = None)]
struct Cli {
    /// Site workbook (xlsx, xls or ods)
    #[arg(long)]
    input: PathBuf,

    /// StationXML file to write
    #[arg(long)]
    output: PathBuf,

    /// StationXML file whose channel responses are looked up by NRL sensor keys
    #[arg(long, env = "UQUAKE_RESPONSE_LIBRARY")]
    response_library: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = InventoryConfig::from_env()?;

    let library: Box<dyn ResponseLibrary> = match &cli.response_library {
        Some(path) => {
            let library = InMemoryResponseLibrary::from_station_xml_file(path)?;
            info!("Loaded {} response(s) from {}", library.len(), path.display());
            Box::new(library)
        }
        None => Box::new(NoResponseLibrary),
    };

    let namespace_uri = config.namespace_uri.clone();
    let importer = SpreadsheetImporter::new(cli.input.to_string_lossy()).with_config(config);
    let outcome = importer.import_with_report(library.as_ref())?;

    println!("\nJoin summary:");
    for report in &outcome.join_reports {
        println!(
            "  {:<26} {:>4} -> {:>4} rows",
            report.step, report.left_rows, report.matched_rows
        );
        if report.dropped() {
            println!("    dropped: {}", report.dropped_keys.join(", "));
        }
    }
    if outcome.dropped_rows() {
        warn!("Some workbook rows had no match and were left out of the inventory");
    }

    let sensors = outcome.inventory.sensors();
    println!("\nTotal sensors: {}", sensors.len());

    outcome
        .inventory
        .write_with_namespace(&cli.output, &namespace_uri)?;
    info!("Wrote inventory to {}", cli.output.display());

    Ok(())
}
