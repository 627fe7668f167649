use crate::{
    error,
    state::AppState,
    timing::{RequestStart, Timed},
};
use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use libnearby::search::{SearchQuery, SearchResult, search};
use serde::Serialize;

pub fn router() -> Router<AppState> {
    Router::new().route("/search", post(search_nearby))
}

#[derive(Serialize)]
struct SearchResponse {
    locations: Vec<SearchResult>,
}

async fn search_nearby(
    State(state): State<AppState>,
    Extension(start): Extension<RequestStart>,
    query: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<Timed<SearchResponse>>, error::Error> {
    let Json(query) = query?;
    let locations = search(&state.db, &query).await?;
    Ok(Json(Timed::new(SearchResponse { locations }, &start)))
}
