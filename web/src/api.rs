use crate::state::AppState;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

mod location;
mod search;
mod tripcost;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .merge(location::router())
        .merge(search::router())
        .merge(tripcost::router())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Nearby Locations API" }))
}
