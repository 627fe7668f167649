//! Estimating the cost of driving from a point to a stored location.
//!
//! An external toll/routing provider can be consulted for a quote. Whatever the
//! provider doesn't supply (or everything, if the provider is not configured or
//! fails) is filled in from a simple fuel cost estimate based on the great-circle
//! distance.
use crate::{
    error::{Error, Result},
    geo::{Coordinate, round_to},
    location::LocationStore,
    number_or_none,
};
use async_trait::async_trait;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_PROVIDER_URL: &str = "https://dev.tollguru.com/v1/calc/route";

/// Parameters for the local fuel cost estimate
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FuelEstimate {
    #[serde(default = "default_km_per_liter")]
    pub km_per_liter: f64,
    #[serde(default = "default_price_per_liter")]
    pub price_per_liter: f64,
}

fn default_km_per_liter() -> f64 {
    12.0
}

fn default_price_per_liter() -> f64 {
    1.5
}

impl Default for FuelEstimate {
    fn default() -> Self {
        Self {
            km_per_liter: default_km_per_liter(),
            price_per_liter: default_price_per_liter(),
        }
    }
}

impl FuelEstimate {
    /// Fuel cost for driving `distance_km`, rounded to cents
    pub fn cost(&self, distance_km: f64) -> f64 {
        round_to(distance_km / self.km_per_liter * self.price_per_liter, 2)
    }
}

/// The starting point of a trip as received from a client
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TripRequest {
    #[serde(default, deserialize_with = "number_or_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub longitude: Option<f64>,
}

impl TripRequest {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            latitude: Some(origin.latitude),
            longitude: Some(origin.longitude),
        }
    }

    pub fn origin(&self) -> Result<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Ok(Coordinate::new(lat, lon))
            }
            _ => Err(Error::InvalidArgument(
                "Provide latitude & longitude in body".to_string(),
            )),
        }
    }
}

/// The parts of a trip cost that an external provider was able to quote
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderQuote {
    pub total_cost: Option<f64>,
    pub toll_cost: Option<f64>,
}

impl ProviderQuote {
    /// Pulls whatever cost figures are present out of a provider's json response
    pub fn from_json(value: &serde_json::Value) -> Self {
        let number = |key: &str| value.get(key).and_then(serde_json::Value::as_f64);
        Self {
            total_cost: number("estimated_total").or_else(|| number("total_price")),
            toll_cost: number("toll_cost").or_else(|| number("tolls_total")),
        }
    }
}

/// An external service that can quote the cost of a trip
#[async_trait]
pub trait TripCostProvider: Send + Sync {
    async fn quote(&self, from: &Coordinate, to: &Coordinate) -> Result<ProviderQuote>;
}

#[derive(Serialize)]
struct ProviderPoint {
    lat: f64,
    lon: f64,
}

impl From<&Coordinate> for ProviderPoint {
    fn from(value: &Coordinate) -> Self {
        Self {
            lat: value.latitude,
            lon: value.longitude,
        }
    }
}

#[derive(Serialize)]
struct ProviderVehicle {
    vehicle_type: &'static str,
}

#[derive(Serialize)]
struct ProviderRequest {
    source: ProviderPoint,
    destination: ProviderPoint,
    vehicle: ProviderVehicle,
}

/// A client for the TollGuru route calculation api
#[derive(Clone)]
pub struct TollGuruClient {
    inner: reqwest::Client,
    url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for TollGuruClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TollGuruClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl TollGuruClient {
    pub fn new(url: &str, api_key: SecretString, timeout: Option<Duration>) -> Result<Self> {
        let url = url
            .parse()
            .map_err(|e| Error::Provider(format!("{url} is not a valid url: {e}")))?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            inner: builder.build()?,
            url,
            api_key,
        })
    }
}

#[async_trait]
impl TripCostProvider for TollGuruClient {
    async fn quote(&self, from: &Coordinate, to: &Coordinate) -> Result<ProviderQuote> {
        let body = ProviderRequest {
            source: from.into(),
            destination: to.into(),
            vehicle: ProviderVehicle {
                vehicle_type: "car",
            },
        };
        debug!(url = %self.url, "requesting trip quote");
        let response: serde_json::Value = self
            .inner
            .post(self.url.clone())
            .header("x-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(ProviderQuote::from_json(&response))
    }
}

/// The estimated cost of a trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripCost {
    pub total_cost: f64,
    pub fuel_cost: f64,
    pub toll_cost: f64,
    pub distance_km: f64,
}

impl TripCost {
    /// Combines a (possibly empty) provider quote with the local fuel estimate
    pub fn combine(quote: ProviderQuote, fuel: &FuelEstimate, distance_km: f64) -> Self {
        let fuel_cost = fuel.cost(distance_km);
        let toll_cost = quote.toll_cost.filter(|t| *t != 0.0).unwrap_or(0.0);
        let total_cost = quote
            .total_cost
            .filter(|t| *t != 0.0)
            .unwrap_or_else(|| round_to(fuel_cost + toll_cost, 2));
        Self {
            total_cost,
            fuel_cost,
            toll_cost,
            distance_km: round_to(distance_km, 3),
        }
    }
}

/// Estimates the cost of a trip from the request's origin to the stored
/// location `location_id`. Provider failures are logged and the local estimate
/// is used instead.
pub async fn estimate_trip_cost<S>(
    store: &S,
    provider: Option<&dyn TripCostProvider>,
    fuel: &FuelEstimate,
    request: &TripRequest,
    location_id: i64,
) -> Result<TripCost>
where
    S: LocationStore + ?Sized,
{
    let origin = request.origin()?;
    let destination = store.get_by_id(location_id).await?.coordinate();
    let distance_km = origin.distance_km(&destination);

    let quote = match provider {
        Some(provider) => match provider.quote(&origin, &destination).await {
            Ok(quote) => quote,
            Err(error) => {
                warn!(%error, "trip cost provider failed, using local estimate");
                ProviderQuote::default()
            }
        },
        None => {
            debug!("no trip cost provider configured, using local estimate");
            ProviderQuote::default()
        }
    };
    Ok(TripCost::combine(quote, fuel, distance_km))
}
