use crate::{
    error,
    state::AppState,
    timing::{RequestStart, Timed},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use libnearby::location::{Location, LocationStore, NewLocation};
use serde::Serialize;
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", post(add_location))
        .route("/locations/{category}", get(list_locations))
}

#[derive(Serialize)]
struct AddResponse {
    id: i64,
}

async fn add_location(
    State(state): State<AppState>,
    Extension(start): Extension<RequestStart>,
    params: Result<Json<NewLocation>, JsonRejection>,
) -> Result<Json<Timed<AddResponse>>, error::Error> {
    let Json(params) = params?;
    let id = state.db.insert(&params).await?;
    debug!(id, "Added location '{}'", params.name);
    Ok(Json(Timed::new(AddResponse { id }, &start)))
}

#[derive(Serialize)]
struct ListResponse {
    locations: Vec<Location>,
}

async fn list_locations(
    State(state): State<AppState>,
    Extension(start): Extension<RequestStart>,
    Path(category): Path<String>,
) -> Result<Json<Timed<ListResponse>>, error::Error> {
    let locations = state.db.query_by_category(&category).await?;
    Ok(Json(Timed::new(ListResponse { locations }, &start)))
}
