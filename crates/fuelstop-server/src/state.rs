//! Shared handler state: the immutable station catalog plus collaborators.

use anyhow::{Context, Result};
use fuelstop_core::{PlannerConfig, StationCatalog};
use reqwest::Client;
use std::sync::Arc;

use crate::cache::MemoryLookupCache;
use crate::config::Config;
use crate::geocoding::{Geocoder, TieredGeocoder};
use crate::routing::{OrsRouteProvider, RouteProvider};
use crate::stations::{load_catalog, PlaceIndex};

pub struct AppState {
    catalog: Arc<StationCatalog>,
    planner: PlannerConfig,
    geocoder: Arc<dyn Geocoder>,
    routes: Arc<dyn RouteProvider>,
}

impl AppState {
    pub fn new(
        catalog: Arc<StationCatalog>,
        planner: PlannerConfig,
        geocoder: Arc<dyn Geocoder>,
        routes: Arc<dyn RouteProvider>,
    ) -> Self {
        Self {
            catalog,
            planner,
            geocoder,
            routes,
        }
    }

    /// Validate the planner constants, load the station dataset once and
    /// wire the HTTP collaborators.
    pub fn from_config(config: &Config) -> Result<Self> {
        config
            .planner
            .validate()
            .context("invalid planner configuration")?;

        let catalog = Arc::new(load_catalog(
            &config.stations_csv_path,
            config.planner.grid(),
        )?);
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: &Config, catalog: Arc<StationCatalog>) -> Self {
        let client = Client::new();
        let places = Arc::new(PlaceIndex::from_catalog(&catalog));
        tracing::debug!(places = places.len(), "built local place index");

        let geocoder = TieredGeocoder::new(
            config,
            client.clone(),
            places,
            Arc::new(MemoryLookupCache::new(config.lookup_cache_max_entries)),
        );
        let routes = OrsRouteProvider::new(
            config,
            client,
            Arc::new(MemoryLookupCache::new(config.lookup_cache_max_entries)),
        );

        Self::new(
            catalog,
            config.planner.clone(),
            Arc::new(geocoder),
            Arc::new(routes),
        )
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn planner(&self) -> &PlannerConfig {
        &self.planner
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.geocoder.as_ref()
    }

    pub fn routes(&self) -> &dyn RouteProvider {
        self.routes.as_ref()
    }
}
