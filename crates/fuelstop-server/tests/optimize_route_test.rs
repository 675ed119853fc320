//! Optimize-route API integration tests.
//!
//! Run with: cargo test --test optimize_route_test -- --ignored
//!
//! Note: Requires a running fuel-stop server at http://localhost:8000
//! (or set FUELSTOP_TEST_URL) with a real station dataset and ORS key.

use reqwest::Client;
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("FUELSTOP_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[tokio::test]
#[ignore]
async fn test_health_endpoint() {
    let client = Client::new();
    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to connect to server");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
#[ignore]
async fn test_cross_country_route_has_stops() {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/optimize-route/", base_url()))
        .json(&json!({"start": "New York, NY", "destination": "Los Angeles, CA"}))
        .send()
        .await
        .expect("Failed to connect to server");

    assert!(response.status().is_success(), "status {}", response.status());
    let body: Value = response.json().await.unwrap();
    let stops = body["optimal_stops"].as_array().unwrap();
    let distance = body["distance_miles"].as_f64().unwrap();

    println!(
        "{} miles, {} stops, ${}",
        distance,
        stops.len(),
        body["total_fuel_cost_usd"]
    );
    assert!(distance > 2_000.0);
    assert!(!stops.is_empty());
    for stop in stops {
        assert!(stop["distance_miles"].as_f64().unwrap() <= 10.0);
        assert_eq!(stop["gallons"].as_f64().unwrap(), 50.0);
    }
}

#[tokio::test]
#[ignore]
async fn test_missing_destination_is_rejected() {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/optimize-route", base_url()))
        .json(&json!({"start": "Denver, CO"}))
        .send()
        .await
        .expect("Failed to connect to server");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["destination"], "'destination' is required");
}
