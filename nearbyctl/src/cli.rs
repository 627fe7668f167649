use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub(crate) struct Cli {
    #[arg(short, long, default_value = "nearby.sqlite")]
    pub(crate) database: PathBuf,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Args, Debug)]
pub(crate) struct OutputOptions {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    #[command(about = "Add a new location to the database")]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long = "lat", allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long = "lon", allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long)]
        category: String,
    },
    #[command(about = "List all locations in a category")]
    List {
        category: String,
        #[command(flatten)]
        output: OutputOptions,
    },
    #[command(about = "Find the locations of a category near a point")]
    Search {
        #[arg(long = "lat", allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long = "lon", allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long)]
        category: String,
        #[arg(short, long = "radius", help = "Search radius in kilometers [default: 2]")]
        radius_km: Option<f64>,
        #[command(flatten)]
        output: OutputOptions,
    },
    #[command(
        about = "Import locations from a csv file",
        long_about = "Import locations from a csv file with the columns \
            name, address, latitude, longitude and category. \
            The file is checked completely before anything is added."
    )]
    Import { file: PathBuf },
    #[command(about = "Estimate the cost of driving to a location")]
    TripCost {
        #[arg(help = "id of the destination location")]
        id: i64,
        #[arg(long = "lat", allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long = "lon", allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long)]
        km_per_liter: Option<f64>,
        #[arg(long)]
        price_per_liter: Option<f64>,
        #[command(flatten)]
        output: OutputOptions,
    },
}
