use libnearby::{location::Location, search::SearchResult, tripcost::TripCost};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct LocationRow {
    id: i64,
    name: String,
    #[tabled(display("tabled::derive::display::option", ""))]
    address: Option<String>,
    latitude: f64,
    longitude: f64,
    category: String,
}

impl From<Location> for LocationRow {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
            address: location.address,
            latitude: location.latitude,
            longitude: location.longitude,
            category: location.category,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct SearchRow {
    id: i64,
    name: String,
    #[tabled(display("tabled::derive::display::option", ""))]
    address: Option<String>,
    #[tabled(rename = "Distance (km)")]
    distance: f64,
}

impl From<SearchResult> for SearchRow {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.id,
            name: result.name,
            address: result.address,
            distance: result.distance,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct TripCostRow {
    #[tabled(rename = "Distance (km)")]
    distance_km: f64,
    #[tabled(rename = "Fuel")]
    fuel_cost: f64,
    #[tabled(rename = "Tolls")]
    toll_cost: f64,
    #[tabled(rename = "Total")]
    total_cost: f64,
}

impl From<TripCost> for TripCostRow {
    fn from(cost: TripCost) -> Self {
        Self {
            distance_km: cost.distance_km,
            fuel_cost: cost.fuel_cost,
            toll_cost: cost.toll_cost,
            total_cost: cost.total_cost,
        }
    }
}
