//! Searching for stored locations near a point.
//!
//! A search runs in two phases. The store is first asked for every location of
//! the requested category inside a bounding box that encloses the search
//! circle. The candidates are then measured with the haversine formula, those
//! outside the radius are dropped, and the rest are ordered by distance.
use crate::{
    error::{Error, Result},
    geo::{BoundingBox, Coordinate, round_to},
    location::{Location, LocationStore},
    number_or_none,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Radius used when a query doesn't specify one
pub const DEFAULT_RADIUS_KM: f64 = 2.0;

const DISTANCE_PRECISION: i32 = 3;

/// The parameters of a nearby search. The center coordinates are optional here
/// so that requests with missing or malformed coordinates can be rejected by
/// [search] with a meaningful error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SearchQuery {
    #[serde(default, deserialize_with = "number_or_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub radius_km: Option<f64>,
}

impl SearchQuery {
    pub fn new(center: Coordinate, category: impl Into<String>, radius_km: Option<f64>) -> Self {
        Self {
            latitude: Some(center.latitude),
            longitude: Some(center.longitude),
            category: category.into(),
            radius_km,
        }
    }

    /// The validated search center
    pub fn center(&self) -> Result<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Ok(Coordinate::new(lat, lon))
            }
            _ => Err(Error::InvalidArgument(
                "latitude and longitude must be numbers".to_string(),
            )),
        }
    }

    /// The validated search radius, falling back to [DEFAULT_RADIUS_KM]
    pub fn radius(&self) -> Result<f64> {
        match self.radius_km {
            None => Ok(DEFAULT_RADIUS_KM),
            Some(r) if r.is_finite() && r >= 0.0 => Ok(r),
            Some(r) => Err(Error::InvalidArgument(format!(
                "radius_km must be a non-negative number, got {r}"
            ))),
        }
    }
}

/// A location found by a search, annotated with its distance from the search center
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    /// kilometers from the search center, rounded to meters
    pub distance: f64,
    pub category: String,
}

impl SearchResult {
    fn new(location: Location, distance: f64) -> Self {
        Self {
            id: location.id,
            name: location.name,
            address: location.address,
            distance,
            category: location.category,
        }
    }
}

/// Finds all locations in `store` of the query's category within the query's
/// radius of its center, nearest first. Equally distant locations are ordered
/// by id.
pub async fn search<S>(store: &S, query: &SearchQuery) -> Result<Vec<SearchResult>>
where
    S: LocationStore + ?Sized,
{
    let center = query.center()?;
    let radius_km = query.radius()?;
    let bbox = BoundingBox::around(&center, radius_km);
    debug!(?center, radius_km, ?bbox, category = %query.category, "searching nearby locations");

    let candidates = store
        .query_by_category_and_bounding_box(&query.category, &bbox)
        .await?;
    let ncandidates = candidates.len();

    // sorted on the exact distance, rounded only for the results
    let mut matches: Vec<(f64, Location)> = candidates
        .into_iter()
        .map(|location| (center.distance_km(&location.coordinate()), location))
        .filter(|(distance, _)| *distance <= radius_km)
        .collect();
    matches.sort_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)));
    let results: Vec<SearchResult> = matches
        .into_iter()
        .map(|(distance, location)| {
            SearchResult::new(location, round_to(distance, DISTANCE_PRECISION))
        })
        .collect();
    debug!(ncandidates, nresults = results.len(), "search complete");
    Ok(results)
}
