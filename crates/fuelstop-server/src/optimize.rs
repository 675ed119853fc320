//! The optimize-route workflow: geocode, route, plan, shape the response.

use fuelstop_core::{plan_fuel_stops, Coverage, RefuelStop, RouteTrace, METERS_PER_MILE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::api::request_id::RequestId;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub start: String,
    pub destination: String,
}

impl OptimizeRequest {
    /// Validate a raw JSON body, collecting one message per bad field.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let mut errors = BTreeMap::new();
        let mut field = |name: &'static str| match body.get(name) {
            None | Some(Value::Null) => {
                errors.insert(name, format!("'{}' is required", name));
                None
            }
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                errors.insert(name, format!("'{}' must be a string", name));
                None
            }
        };
        let start = field("start");
        let destination = field("destination");

        match (start, destination) {
            (Some(start), Some(destination)) => Ok(Self { start, destination }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopResponse {
    pub station_name: String,
    pub station_address: String,
    pub station_lat: f64,
    pub station_lon: f64,
    pub price: f64,
    pub gallons: f64,
    pub distance_miles: f64,
}

impl From<&RefuelStop> for StopResponse {
    fn from(stop: &RefuelStop) -> Self {
        Self {
            station_name: stop.station_name.clone(),
            station_address: stop.station_address.clone(),
            station_lat: stop.station_lat,
            station_lon: stop.station_lon,
            price: stop.price_per_gallon,
            gallons: round2(stop.gallons),
            distance_miles: round2(stop.distance_miles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
    Complete,
    Truncated,
}

impl From<Coverage> for CoverageStatus {
    fn from(coverage: Coverage) -> Self {
        match coverage {
            Coverage::Complete => CoverageStatus::Complete,
            Coverage::Truncated { .. } => CoverageStatus::Truncated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub start: String,
    pub destination: String,
    pub distance_miles: f64,
    pub fuel_needed_gallons: f64,
    pub total_fuel_cost_usd: f64,
    pub coverage: CoverageStatus,
    pub refuel_points: usize,
    pub optimal_stops: Vec<StopResponse>,
    pub route_geometry: Value,
    pub processing_time_sec: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub async fn optimize_route(
    state: &AppState,
    request_id: &RequestId,
    request: OptimizeRequest,
) -> Result<OptimizeResponse, ApiError> {
    let started = Instant::now();

    let start = state.geocoder().geocode(&request.start).await;
    let destination = state.geocoder().geocode(&request.destination).await;
    let (Some(start), Some(destination)) = (start, destination) else {
        tracing::info!(
            request_id = %request_id,
            start = %request.start,
            destination = %request.destination,
            "address could not be geocoded"
        );
        return Err(ApiError::InvalidAddress);
    };

    let route = state.routes().route(start, destination).await?;
    let trace = RouteTrace::from_geojson_coordinates(&route.coordinates);
    let plan = plan_fuel_stops(&trace, state.catalog(), state.planner());

    let distance_miles = route.distance_m / METERS_PER_MILE;
    let fuel_needed = distance_miles / state.planner().mpg;
    tracing::info!(
        request_id = %request_id,
        points = trace.len(),
        refuel_points = plan.refuel_points.len(),
        stops = plan.stops.len(),
        distance_miles,
        "planned fuel stops"
    );
    if !plan.coverage.is_complete() {
        tracing::warn!(
            request_id = %request_id,
            coverage = ?plan.coverage,
            "fuel plan does not cover the whole route"
        );
    }

    Ok(OptimizeResponse {
        start: request.start,
        destination: request.destination,
        distance_miles: round2(distance_miles),
        fuel_needed_gallons: round2(fuel_needed),
        total_fuel_cost_usd: round2(plan.total_cost),
        coverage: plan.coverage.into(),
        refuel_points: plan.refuel_points.len(),
        optimal_stops: plan.stops.iter().map(StopResponse::from).collect(),
        route_geometry: route.geometry,
        processing_time_sec: round2(started.elapsed().as_secs_f64()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_requires_both_fields() {
        let err = OptimizeRequest::from_json(&json!({"destination": "Dallas, TX"})).unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields["start"], "'start' is required");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = OptimizeRequest::from_json(&json!({"start": 4, "destination": null})).unwrap_err();
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields["start"], "'start' must be a string");
        assert_eq!(fields["destination"], "'destination' is required");

        let ok = OptimizeRequest::from_json(&json!({"start": "A", "destination": "B"})).unwrap();
        assert_eq!(ok.start, "A");
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(786.31849), 786.32);
        assert_eq!(round2(155.0), 155.0);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn coverage_serializes_as_status_word() {
        let status: CoverageStatus = Coverage::Truncated { trace_index: 400 }.into();
        assert_eq!(serde_json::to_value(status).unwrap(), json!("truncated"));
        assert_eq!(
            serde_json::to_value(CoverageStatus::from(Coverage::Complete)).unwrap(),
            json!("complete")
        );
    }
}
