//! Commands that query locations relative to a point
use crate::output::{
    self, OutputFormat,
    rows::{SearchRow, TripCostRow},
};
use anyhow::Result;
use libnearby::{
    geo::Coordinate,
    location::LocationStore,
    search::{SearchQuery, search},
    tripcost::{FuelEstimate, TripRequest, estimate_trip_cost},
};

/// Handle the `nearbyctl search` command
pub(crate) async fn nearby<S: LocationStore + ?Sized>(
    store: &S,
    query: SearchQuery,
    format: OutputFormat,
) -> Result<()> {
    let results = search(store, &query).await?;
    let str = output::format_seq(results.into_iter().map(SearchRow::from), format)?;
    println!("{str}");
    Ok(())
}

/// Handle the `nearbyctl trip-cost` command. The tool has no provider
/// credentials, so the cost is always the local fuel estimate.
pub(crate) async fn trip_cost<S: LocationStore + ?Sized>(
    store: &S,
    id: i64,
    origin: Coordinate,
    fuel: FuelEstimate,
    format: OutputFormat,
) -> Result<()> {
    let cost = estimate_trip_cost(store, None, &fuel, &TripRequest::new(origin), id).await?;
    let str = output::format_one(TripCostRow::from(cost), format)?;
    println!("{str}");
    Ok(())
}
