use crate::test_app;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use libnearby::{
    geo::Coordinate,
    tripcost::{ProviderQuote, TripCostProvider},
};
use serde_json::{Value, json};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use test_log::test;
use tower::Service;

/// a provider that always quotes the same figures
struct FixedProvider(ProviderQuote);

#[async_trait]
impl TripCostProvider for FixedProvider {
    async fn quote(
        &self,
        _from: &Coordinate,
        _to: &Coordinate,
    ) -> libnearby::Result<ProviderQuote> {
        Ok(self.0.clone())
    }
}

/// sends a request to the app and returns the status and the parsed json body
async fn send(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");
    let response = app
        .as_service()
        .call(request)
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("Response body is not json");
    (status, json)
}

fn ids(body: &Value) -> Vec<i64> {
    body["locations"]
        .as_array()
        .expect("no locations in response")
        .iter()
        .map(|l| l["id"].as_i64().expect("no id"))
        .collect()
}

fn assert_timed(body: &Value) {
    let time_ns = body["time_ns"].as_str().expect("no time_ns in response");
    assert!(time_ns.parse::<u128>().is_ok(), "bad time_ns {time_ns}");
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_root(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let (status, body) = send(&mut app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Nearby Locations API");
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_create_and_list(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let (status, body) = send(
        &mut app,
        "POST",
        "/locations",
        Some(json!({
            "name": "Cafe A",
            "address": "MG Road",
            "latitude": 12.9716,
            "longitude": 77.5946,
            "category": "cafe"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_timed(&body);
    let id = body["id"].as_i64().expect("no id");

    let (status, _) = send(
        &mut app,
        "POST",
        "/locations",
        Some(json!({
            "name": "Bistro",
            "latitude": 12.9,
            "longitude": 77.5,
            "category": "restaurant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&mut app, "GET", "/locations/cafe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_timed(&body);
    assert_eq!(
        body["locations"],
        json!([{
            "id": id,
            "name": "Cafe A",
            "address": "MG Road",
            "latitude": 12.9716,
            "longitude": 77.5946,
            "category": "cafe"
        }])
    );

    let (status, body) = send(&mut app, "GET", "/locations/museum", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locations"], json!([]));
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_create_invalid(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let bodies = [
        json!({"latitude": 1.0, "longitude": 1.0, "category": "cafe"}),
        json!({"name": "", "latitude": 1.0, "longitude": 1.0, "category": "cafe"}),
        json!({"name": "x", "latitude": 91.0, "longitude": 1.0, "category": "cafe"}),
        json!({"name": "x", "latitude": 1.0, "longitude": 1.0, "category": ""}),
        json!({"name": "x", "latitude": "north", "longitude": 1.0, "category": "cafe"}),
    ];
    for body in bodies {
        let (status, response) = send(&mut app, "POST", "/locations", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert!(response["error"].is_string());
        assert_timed(&response);
    }
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_search_bangalore_chennai(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    for (name, lat, lon) in [("Cafe A", 12.9716, 77.5946), ("Cafe B", 13.0827, 80.2707)] {
        let (status, _) = send(
            &mut app,
            "POST",
            "/locations",
            Some(json!({"name": name, "latitude": lat, "longitude": lon, "category": "cafe"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &mut app,
        "POST",
        "/search",
        Some(json!({"latitude": 12.9716, "longitude": 77.5946, "category": "cafe", "radius_km": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_timed(&body);
    let locations = body["locations"].as_array().expect("no locations");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["name"], "Cafe A");
    assert_eq!(locations[0]["distance"].as_f64(), Some(0.0));

    let (status, body) = send(
        &mut app,
        "POST",
        "/search",
        Some(json!({"latitude": 12.9716, "longitude": 77.5946, "category": "cafe", "radius_km": 400})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["locations"]
        .as_array()
        .expect("no locations")
        .iter()
        .map(|l| l["name"].as_str().expect("no name"))
        .collect();
    assert_eq!(names, vec!["Cafe A", "Cafe B"]);
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../db/fixtures", scripts("locations"))
))]
async fn test_search_default_radius(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let (status, default) = send(
        &mut app,
        "POST",
        "/search",
        Some(json!({"latitude": 12.9716, "longitude": 77.5946, "category": "cafe"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&default), vec![1, 3]);

    let (_, explicit) = send(
        &mut app,
        "POST",
        "/search",
        Some(json!({"latitude": 12.9716, "longitude": 77.5946, "category": "cafe", "radius_km": 2.0})),
    )
    .await;
    assert_eq!(default["locations"], explicit["locations"]);
    assert_eq!(default["locations"][1]["distance"].as_f64(), Some(0.697));
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../db/fixtures", scripts("locations"))
))]
async fn test_search_invalid(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let bodies = [
        json!({"longitude": 77.5946, "category": "cafe"}),
        json!({"latitude": "12.9716", "longitude": 77.5946, "category": "cafe"}),
        json!({"latitude": 12.9716, "longitude": null, "category": "cafe"}),
        json!({"latitude": 12.9716, "longitude": 77.5946, "category": "cafe", "radius_km": -3}),
        json!({"latitude": 12.9716, "longitude": 77.5946, "category": "cafe", "radius_km": "far"}),
    ];
    for body in bodies {
        let (status, response) = send(&mut app, "POST", "/search", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert!(response["error"].is_string());
        assert_timed(&response);
    }
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../db/fixtures", scripts("locations"))
))]
async fn test_trip_cost_local_estimate(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let (status, body) = send(
        &mut app,
        "POST",
        "/trip-cost/2",
        Some(json!({"latitude": 12.9716, "longitude": 77.5946})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_timed(&body);
    let distance = body["distance_km"].as_f64().expect("no distance");
    assert!((distance - 290.172).abs() < 0.001);
    assert_eq!(body["toll_cost"].as_f64(), Some(0.0));
    assert_eq!(body["fuel_cost"].as_f64(), Some(36.27));
    assert_eq!(body["total_cost"], body["fuel_cost"]);
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../db/fixtures", scripts("locations"))
))]
async fn test_trip_cost_with_provider(pool: Pool<Sqlite>) {
    let provider = FixedProvider(ProviderQuote {
        total_cost: None,
        toll_cost: Some(5.5),
    });
    let (mut app, _state) = test_app(pool, Some(Arc::new(provider)));
    let (status, body) = send(
        &mut app,
        "POST",
        "/trip-cost/2",
        Some(json!({"latitude": 12.9716, "longitude": 77.5946})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["toll_cost"].as_f64(), Some(5.5));
    assert_eq!(body["total_cost"].as_f64(), Some(41.77));
}

#[test(sqlx::test(
    migrations = "../db/migrations/",
    fixtures(path = "../../db/fixtures", scripts("locations"))
))]
async fn test_trip_cost_errors(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool, None);
    let origin = json!({"latitude": 12.9716, "longitude": 77.5946});

    let (status, body) = send(&mut app, "POST", "/trip-cost/99", Some(origin.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Location not found");
    assert_timed(&body);

    let (status, _) = send(&mut app, "POST", "/trip-cost/abc", Some(origin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &mut app,
        "POST",
        "/trip-cost/2",
        Some(json!({"latitude": 12.9716})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provide latitude & longitude in body");
}
