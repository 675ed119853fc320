//! Address to coordinate resolution.
//!
//! Tiers are tried in order: lookup cache, the local place index built from
//! the station dataset, Nominatim, then OpenCage (only with an API key). A
//! failing provider is logged and the next tier is tried; every hit is cached.

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::LookupCache;
use crate::config::Config;
use crate::stations::PlaceIndex;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form address; `None` when no tier knows it.
    async fn geocode(&self, address: &str) -> Option<Coordinates>;
}

pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

pub struct TieredGeocoder {
    client: Client,
    places: Arc<PlaceIndex>,
    cache: Arc<dyn LookupCache<Coordinates>>,
    cache_ttl: Duration,
    nominatim_url: String,
    nominatim_limiter: Option<DefaultDirectRateLimiter>,
    opencage_url: String,
    opencage_api_key: Option<String>,
    user_agent: String,
    timeout: Duration,
}

impl TieredGeocoder {
    pub fn new(
        config: &Config,
        client: Client,
        places: Arc<PlaceIndex>,
        cache: Arc<dyn LookupCache<Coordinates>>,
    ) -> Self {
        let nominatim_limiter = Quota::with_period(Duration::from_millis(
            config.nominatim_min_interval_ms,
        ))
        .map(DefaultDirectRateLimiter::direct);

        Self {
            client,
            places,
            cache,
            cache_ttl: Duration::from_secs(config.lookup_cache_ttl_s),
            nominatim_url: config.nominatim_url.clone(),
            nominatim_limiter,
            opencage_url: config.opencage_url.clone(),
            opencage_api_key: config.opencage_api_key.clone(),
            user_agent: config.geocoder_user_agent.clone(),
            timeout: Duration::from_secs(config.geocode_timeout_s.max(1)),
        }
    }

    async fn nominatim(&self, address: &str) -> Result<Option<Coordinates>> {
        if let Some(limiter) = &self.nominatim_limiter {
            limiter.until_ready().await;
        }

        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.nominatim_url)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "us"),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .context("nominatim request failed")?
            .error_for_status()
            .context("nominatim returned an error status")?
            .json()
            .await
            .context("failed to parse nominatim response")?;

        let Some(place) = places.first() else {
            return Ok(None);
        };
        let lat = place.lat.parse().context("nominatim lat is not a number")?;
        let lon = place.lon.parse().context("nominatim lon is not a number")?;
        Ok(Some(Coordinates { lat, lon }))
    }

    async fn opencage(&self, address: &str, api_key: &str) -> Result<Option<Coordinates>> {
        let response: OpenCageResponse = self
            .client
            .get(&self.opencage_url)
            .query(&[
                ("q", address),
                ("key", api_key),
                ("limit", "1"),
                ("countrycode", "us"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .context("opencage request failed")?
            .error_for_status()
            .context("opencage returned an error status")?
            .json()
            .await
            .context("failed to parse opencage response")?;

        Ok(response.results.first().map(|result| Coordinates {
            lat: result.geometry.lat,
            lon: result.geometry.lng,
        }))
    }

    fn remember(&self, key: &str, coords: Coordinates) -> Option<Coordinates> {
        self.cache.set(key, coords, self.cache_ttl);
        Some(coords)
    }
}

#[async_trait]
impl Geocoder for TieredGeocoder {
    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        let normalized = normalize_address(address);
        if normalized.is_empty() {
            return None;
        }
        let cache_key = format!("geocode:{}", normalized);

        if let Some(coords) = self.cache.get(&cache_key) {
            return Some(coords);
        }

        if let Some(coords) = self.places.lookup(&normalized) {
            tracing::debug!(address = %normalized, "geocoded from station dataset");
            return self.remember(&cache_key, coords);
        }

        match self.nominatim(address.trim()).await {
            Ok(Some(coords)) => return self.remember(&cache_key, coords),
            Ok(None) => tracing::debug!(address = %normalized, "nominatim found nothing"),
            Err(err) => tracing::warn!("Nominatim error for '{}': {:#}", address, err),
        }

        let api_key = self.opencage_api_key.as_deref()?;
        match self.opencage(address.trim(), api_key).await {
            Ok(Some(coords)) => return self.remember(&cache_key, coords),
            Ok(None) => tracing::debug!(address = %normalized, "opencage found nothing"),
            Err(err) => tracing::error!("OpenCage error for '{}': {:#}", address, err),
        }

        None
    }
}
