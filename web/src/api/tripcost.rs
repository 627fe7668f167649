use crate::{
    error,
    state::AppState,
    timing::{RequestStart, Timed},
};
use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::post,
};
use libnearby::tripcost::{TripCost, TripRequest, estimate_trip_cost};

pub fn router() -> Router<AppState> {
    Router::new().route("/trip-cost/{location_id}", post(trip_cost))
}

async fn trip_cost(
    State(state): State<AppState>,
    Extension(start): Extension<RequestStart>,
    location_id: Result<Path<i64>, PathRejection>,
    request: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<Timed<TripCost>>, error::Error> {
    let Path(location_id) = location_id?;
    let Json(request) = request?;
    let cost = estimate_trip_cost(
        &state.db,
        state.trip_provider(),
        &state.config.trip_cost.fuel,
        &request,
        location_id,
    )
    .await?;
    Ok(Json(Timed::new(cost, &start)))
}
