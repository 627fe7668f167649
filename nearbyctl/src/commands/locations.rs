//! Commands for adding, listing and importing locations
use crate::output::{self, OutputFormat, rows::LocationRow};
use anyhow::{Context, Result};
use libnearby::location::{LocationStore, NewLocation};
use std::{io::Read, path::Path};
use tracing::debug;

/// Handle the `nearbyctl add` command
pub(crate) async fn add<S: LocationStore + ?Sized>(store: &S, location: NewLocation) -> Result<()> {
    let id = store.insert(&location).await?;
    println!("Added location {id} to database");
    Ok(())
}

/// Handle the `nearbyctl list` command
pub(crate) async fn list<S: LocationStore + ?Sized>(
    store: &S,
    category: &str,
    format: OutputFormat,
) -> Result<()> {
    let locations = store.query_by_category(category).await?;
    let str = output::format_seq(locations.into_iter().map(LocationRow::from), format)?;
    println!("{str}");
    Ok(())
}

/// Handle the `nearbyctl import` command
pub(crate) async fn import<S: LocationStore + ?Sized>(store: &S, file: &Path) -> Result<()> {
    let reader = std::fs::File::open(file)
        .with_context(|| format!("Unable to open '{}'", file.display()))?;
    let ids = import_locations(store, reader).await?;
    println!("Imported {} locations from '{}'", ids.len(), file.display());
    Ok(())
}

/// Reads locations from csv data with a header row and adds them to the store.
/// Every record is parsed and validated before the first one is added, so a
/// bad record leaves the store untouched.
pub(crate) async fn import_locations<S, R>(store: &S, reader: R) -> Result<Vec<i64>>
where
    S: LocationStore + ?Sized,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut locations = Vec::new();
    for (n, record) in reader.deserialize::<NewLocation>().enumerate() {
        // header is line 1
        let line = n + 2;
        let location = record.with_context(|| format!("Unable to parse line {line}"))?;
        location
            .validate()
            .with_context(|| format!("Invalid location on line {line}"))?;
        locations.push(location);
    }
    debug!("Parsed {} locations", locations.len());

    let mut ids = Vec::with_capacity(locations.len());
    for location in &locations {
        ids.push(store.insert(location).await?);
    }
    Ok(ids)
}
