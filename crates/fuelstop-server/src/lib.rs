//! Fuel-stop optimization service: dataset loading, external lookups and the
//! HTTP API around `fuelstop-core`.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod optimize;
pub mod routing;
pub mod state;
pub mod stations;
