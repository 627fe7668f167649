//! This is a command-line tool to manage and query nearby locations via [libnearby]
use crate::cli::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use libnearby::{
    Database,
    geo::Coordinate,
    location::NewLocation,
    search::SearchQuery,
    tripcost::FuelEstimate,
};
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;

mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("NEARBYCTL_LOG"))
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();
    debug!(database = %args.database.display(), "opening database");
    let db = Database::open(&args.database).await?;

    match args.command {
        Commands::Add {
            name,
            address,
            latitude,
            longitude,
            category,
        } => {
            let location = NewLocation::new(name, address, latitude, longitude, category);
            commands::locations::add(&db, location).await
        }
        Commands::List { category, output } => {
            commands::locations::list(&db, &category, output.format).await
        }
        Commands::Search {
            latitude,
            longitude,
            category,
            radius_km,
            output,
        } => {
            let query = SearchQuery::new(Coordinate::new(latitude, longitude), category, radius_km);
            commands::search::nearby(&db, query, output.format).await
        }
        Commands::Import { file } => commands::locations::import(&db, &file).await,
        Commands::TripCost {
            id,
            latitude,
            longitude,
            km_per_liter,
            price_per_liter,
            output,
        } => {
            let defaults = FuelEstimate::default();
            let fuel = FuelEstimate {
                km_per_liter: km_per_liter.unwrap_or(defaults.km_per_liter),
                price_per_liter: price_per_liter.unwrap_or(defaults.price_per_liter),
            };
            commands::search::trip_cost(
                &db,
                id,
                Coordinate::new(latitude, longitude),
                fuel,
                output.format,
            )
            .await
        }
    }
}
