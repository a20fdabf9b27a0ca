use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use trip_atlas_compiler::gtfs_time::ServiceDate;
use trip_atlas_compiler::keys::RouteKey;
use trip_atlas_compiler::prepare_compiled_feed::{load_compiled_feed, prepare_compiled_feed};

#[derive(Parser, Debug)]
#[command(about = "Compile GTFS feeds for the trip atlas visualizer")]
struct Cli {
    #[arg(long, default_value = "info", global = true)]
    log_level: log::LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a GTFS directory into an archive.
    Compile {
        gtfs_folder: PathBuf,
        /// Defaults to compiled_feed_rkyv.bin inside the GTFS directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the compiled summary of a trip.
    Trip { compiled: PathBuf, trip_id: String },
    /// Print the itinerary followed by a trip.
    Itinerary { compiled: PathBuf, trip_id: String },
    /// Print the hour buckets of a route for every service running on a date.
    TripsByDate {
        compiled: PathBuf,
        /// YYYYMMDD
        date: ServiceDate,
        route_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    simple_logger::SimpleLogger::new()
        .with_level(cli.log_level)
        .init()?;

    match cli.command {
        Command::Compile {
            gtfs_folder,
            output,
        } => {
            let output_path = prepare_compiled_feed(&gtfs_folder, output.as_deref())
                .await
                .with_context(|| format!("Unable to compile {:?}", gtfs_folder))?;
            println!("{}", output_path.display());
        }
        Command::Trip { compiled, trip_id } => {
            let feed = load_compiled_feed(&compiled).await?;
            let trip = feed
                .trip_by_raw_id(&trip_id)
                .with_context(|| format!("Trip {} not found", trip_id))?;
            println!("{}", serde_json::to_string_pretty(trip)?);
        }
        Command::Itinerary { compiled, trip_id } => {
            let feed = load_compiled_feed(&compiled).await?;
            let itinerary = feed
                .trip_by_raw_id(&trip_id)
                .and_then(|trip| feed.itinerary(&trip.itinerary_key))
                .with_context(|| format!("No itinerary for trip {}", trip_id))?;
            println!("{}", serde_json::to_string_pretty(itinerary)?);
        }
        Command::TripsByDate {
            compiled,
            date,
            route_id,
        } => {
            let feed = load_compiled_feed(&compiled).await?;
            let buckets = feed.trips_by_date(date, RouteKey::derive(&route_id));
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }
    }

    Ok(())
}
