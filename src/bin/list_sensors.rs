/// List the sensors of a StationXML inventory with their local coordinates
use clap::Parser;
use std::path::PathBuf;
use uquake_inventory::inventory::LocalCoordinates;
use uquake_inventory::stationxml::read_inventory;

#[derive(Parser)]
#[command(name = "list-sensors")]
#[command(about = "List sensors and local coordinates from a StationXML file", long_about = None)]
struct Cli {
    /// StationXML inventory
    #[arg(long)]
    input: PathBuf,

    /// Only list sensors of this station
    #[arg(long)]
    station: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("Reading inventory from: {}", cli.input.display());
    let inventory = read_inventory(&cli.input)?;

    let sensors: Vec<_> = inventory
        .sensors()
        .into_iter()
        .filter(|s| cli.station.as_deref().map_or(true, |code| s.station_code() == code))
        .collect();

    println!("\nTotal sensors found: {}", sensors.len());
    for sensor in &sensors {
        match sensor.loc() {
            Ok([x, y, z]) => println!(
                "  {:<16} {:>4} channel(s)  x={:.1} y={:.1} z={:.1}",
                sensor.sensor_code(),
                sensor.channels().len(),
                x,
                y,
                z
            ),
            Err(_) => println!(
                "  {:<16} {:>4} channel(s)  (no local coordinates)",
                sensor.sensor_code(),
                sensor.channels().len()
            ),
        }
    }

    Ok(())
}
