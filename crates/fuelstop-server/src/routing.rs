//! Driving routes from OpenRouteService.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::LookupCache;
use crate::config::Config;
use crate::geocoding::Coordinates;

/// A provider route: the raw GeoJSON geometry, its `[lon, lat]` positions
/// and the driving distance the provider reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub geometry: Value,
    pub coordinates: Vec<[f64; 2]>,
    pub distance_m: f64,
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route unavailable: {0:#}")]
    Unavailable(anyhow::Error),
    #[error("route geometry is not a LineString")]
    InvalidGeometry,
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, start: Coordinates, end: Coordinates) -> Result<RouteGeometry, RouteError>;
}

/// `[lon, lat]` positions of a GeoJSON LineString.
///
/// Returns `None` for any other geometry type, missing coordinates, or
/// positions that are not at least two finite numbers.
pub fn line_string_coordinates(geometry: &Value) -> Option<Vec<[f64; 2]>> {
    if geometry.get("type")?.as_str()? != "LineString" {
        return None;
    }
    geometry
        .get("coordinates")?
        .as_array()?
        .iter()
        .map(|position| {
            let position = position.as_array()?;
            let lon = position.first()?.as_f64()?;
            let lat = position.get(1)?.as_f64()?;
            (lon.is_finite() && lat.is_finite()).then_some([lon, lat])
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    #[serde(default)]
    features: Vec<OrsFeature>,
}

#[derive(Debug, Deserialize)]
struct OrsFeature {
    geometry: Value,
    #[serde(default)]
    properties: OrsProperties,
}

#[derive(Debug, Default, Deserialize)]
struct OrsProperties {
    #[serde(default)]
    segments: Vec<OrsDistance>,
    summary: Option<OrsDistance>,
}

#[derive(Debug, Deserialize)]
struct OrsDistance {
    #[serde(default)]
    distance: Option<f64>,
}

impl OrsProperties {
    fn distance_m(&self) -> f64 {
        self.segments
            .first()
            .and_then(|segment| segment.distance)
            .or_else(|| self.summary.as_ref().and_then(|summary| summary.distance))
            .unwrap_or(0.0)
    }
}

pub struct OrsRouteProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    cache: Arc<dyn LookupCache<RouteGeometry>>,
    cache_ttl: Duration,
}

impl OrsRouteProvider {
    pub fn new(config: &Config, client: Client, cache: Arc<dyn LookupCache<RouteGeometry>>) -> Self {
        Self {
            client,
            base_url: config.ors_base_url.trim_end_matches('/').to_string(),
            api_key: config.ors_api_key.clone(),
            timeout: Duration::from_secs(config.routing_timeout_s.max(1)),
            cache,
            cache_ttl: Duration::from_secs(config.lookup_cache_ttl_s),
        }
    }

    fn cache_key(start: Coordinates, end: Coordinates) -> String {
        format!("route:{}_{}_{}_{}", start.lat, start.lon, end.lat, end.lon)
    }

    async fn fetch(&self, start: Coordinates, end: Coordinates) -> anyhow::Result<OrsFeature> {
        let url = format!("{}/v2/directions/driving-car/geojson", self.base_url);
        let body = json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
        });

        let response: OrsResponse = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .context("routing request failed")?
            .error_for_status()
            .context("routing provider returned an error status")?
            .json()
            .await
            .context("failed to parse routing response")?;

        response
            .features
            .into_iter()
            .next()
            .context("routing response has no features")
    }
}

#[async_trait]
impl RouteProvider for OrsRouteProvider {
    async fn route(&self, start: Coordinates, end: Coordinates) -> Result<RouteGeometry, RouteError> {
        let cache_key = Self::cache_key(start, end);
        if let Some(route) = self.cache.get(&cache_key) {
            return Ok(route);
        }

        let feature = self.fetch(start, end).await.map_err(|err| {
            tracing::error!("Routing error: {:#}", err);
            RouteError::Unavailable(err)
        })?;
        let coordinates =
            line_string_coordinates(&feature.geometry).ok_or(RouteError::InvalidGeometry)?;

        let route = RouteGeometry {
            distance_m: feature.properties.distance_m(),
            geometry: feature.geometry,
            coordinates,
        };
        self.cache.set(&cache_key, route.clone(), self.cache_ttl);
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryLookupCache;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DENVER: Coordinates = Coordinates { lat: 39.74, lon: -104.99 };
    const DALLAS: Coordinates = Coordinates { lat: 32.78, lon: -96.8 };

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base: &str) -> OrsRouteProvider {
        let mut config = Config::from_vars(|_| None);
        config.ors_base_url = format!("{}/", base);
        config.ors_api_key = "ors-key".to_string();
        OrsRouteProvider::new(&config, Client::new(), Arc::new(MemoryLookupCache::new(8)))
    }

    #[test]
    fn line_string_coordinates_accepts_only_line_strings() {
        let line = json!({"type": "LineString", "coordinates": [[-104.99, 39.74], [-96.8, 32.78]]});
        assert_eq!(
            line_string_coordinates(&line),
            Some(vec![[-104.99, 39.74], [-96.8, 32.78]])
        );

        let point = json!({"type": "Point", "coordinates": [-104.99, 39.74]});
        assert_eq!(line_string_coordinates(&point), None);
        let missing = json!({"type": "LineString"});
        assert_eq!(line_string_coordinates(&missing), None);
        let bad_position = json!({"type": "LineString", "coordinates": [[-104.99]]});
        assert_eq!(line_string_coordinates(&bad_position), None);
    }

    #[tokio::test]
    async fn parses_ors_route_and_caches_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/v2/directions/driving-car/geojson",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(headers.get("authorization").unwrap(), "ors-key");
                    assert_eq!(body["coordinates"][0], json!([-104.99, 39.74]));
                    Json(json!({
                        "features": [{
                            "geometry": {
                                "type": "LineString",
                                "coordinates": [[-104.99, 39.74], [-100.0, 36.0], [-96.8, 32.78]]
                            },
                            "properties": {
                                "segments": [{"distance": 1_265_000.0}],
                                "summary": {"distance": 1.0}
                            }
                        }]
                    }))
                }
            }),
        );
        let base = spawn_provider(router).await;
        let provider = provider(&base);

        let route = provider.route(DENVER, DALLAS).await.unwrap();
        assert_eq!(route.coordinates.len(), 3);
        assert_eq!(route.distance_m, 1_265_000.0);

        let again = provider.route(DENVER, DALLAS).await.unwrap();
        assert_eq!(again, route);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn summary_distance_is_the_fallback() {
        let router = Router::new().route(
            "/v2/directions/driving-car/geojson",
            post(|| async {
                Json(json!({
                    "features": [{
                        "geometry": {"type": "LineString", "coordinates": [[-104.99, 39.74], [-96.8, 32.78]]},
                        "properties": {"summary": {"distance": 42_000.0}}
                    }]
                }))
            }),
        );
        let base = spawn_provider(router).await;
        let route = provider(&base).route(DENVER, DALLAS).await.unwrap();
        assert_eq!(route.distance_m, 42_000.0);
    }

    #[tokio::test]
    async fn non_line_string_geometry_is_rejected() {
        let router = Router::new().route(
            "/v2/directions/driving-car/geojson",
            post(|| async {
                Json(json!({
                    "features": [{"geometry": {"type": "Point", "coordinates": [-104.99, 39.74]}}]
                }))
            }),
        );
        let base = spawn_provider(router).await;
        let err = provider(&base).route(DENVER, DALLAS).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidGeometry));
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable() {
        let router = Router::new().route(
            "/v2/directions/driving-car/geojson",
            post(|| async { (axum::http::StatusCode::FORBIDDEN, "quota exceeded") }),
        );
        let base = spawn_provider(router).await;
        let err = provider(&base).route(DENVER, DALLAS).await.unwrap_err();
        assert!(matches!(err, RouteError::Unavailable(_)));

        let err = provider("http://127.0.0.1:9").route(DENVER, DALLAS).await.unwrap_err();
        assert!(matches!(err, RouteError::Unavailable(_)));
    }
}
