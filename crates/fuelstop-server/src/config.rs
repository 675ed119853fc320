//! Server configuration from environment.

use fuelstop_core::PlannerConfig;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Station dataset loaded once at startup
    pub stations_csv_path: String,
    pub ors_api_key: String,
    pub ors_base_url: String,
    pub nominatim_url: String,
    /// Minimum spacing between Nominatim calls (0 disables throttling)
    pub nominatim_min_interval_ms: u64,
    pub opencage_url: String,
    pub opencage_api_key: Option<String>,
    pub geocoder_user_agent: String,
    pub geocode_timeout_s: u64,
    pub routing_timeout_s: u64,
    pub lookup_cache_ttl_s: u64,
    pub lookup_cache_max_entries: usize,
    pub planner: PlannerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unset or unparsable values
    /// fall back to defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| var(name).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let defaults = PlannerConfig::default();

        Self {
            server_port: parse_or(parse("FUELSTOP_PORT"), 8000),
            stations_csv_path: parse("FUEL_PRICES_CSV")
                .unwrap_or_else(|| "fuel_prices_with_coords.csv".to_string()),
            ors_api_key: parse("ORS_API_KEY").unwrap_or_default(),
            ors_base_url: parse("ORS_BASE_URL")
                .unwrap_or_else(|| "https://api.openrouteservice.org".to_string()),
            nominatim_url: parse("NOMINATIM_URL")
                .unwrap_or_else(|| "https://nominatim.openstreetmap.org/search".to_string()),
            nominatim_min_interval_ms: parse_or(parse("NOMINATIM_MIN_INTERVAL_MS"), 1000),
            opencage_url: parse("OPENCAGE_URL")
                .unwrap_or_else(|| "https://api.opencagedata.com/geocode/v1/json".to_string()),
            opencage_api_key: parse("OPENCAGE_API_KEY"),
            geocoder_user_agent: parse("GEOCODER_USER_AGENT")
                .unwrap_or_else(|| format!("fuelstop-server/{}", env!("CARGO_PKG_VERSION"))),
            geocode_timeout_s: parse_or(parse("HTTP_TIMEOUT_S"), 5),
            routing_timeout_s: parse_or(parse("ROUTING_TIMEOUT_S"), 15),
            lookup_cache_ttl_s: parse_or(parse("LOOKUP_CACHE_TTL_S"), 86_400),
            lookup_cache_max_entries: parse_or(parse("LOOKUP_CACHE_MAX_ENTRIES"), 1024),
            planner: PlannerConfig {
                max_range_miles: parse_or(parse("MAX_RANGE_MILES"), defaults.max_range_miles),
                search_radius_miles: parse_or(
                    parse("SEARCH_RADIUS_MILES"),
                    defaults.search_radius_miles,
                ),
                mpg: parse_or(parse("MPG"), defaults.mpg),
                stride: parse_or(parse("REFUEL_STRIDE"), defaults.stride),
                lookahead_window: parse_or(parse("REFUEL_LOOKAHEAD"), defaults.lookahead_window),
                trigger_fraction: parse_or(
                    parse("REFUEL_TRIGGER_FRACTION"),
                    defaults.trigger_fraction,
                ),
                accept_fraction: parse_or(
                    parse("REFUEL_ACCEPT_FRACTION"),
                    defaults.accept_fraction,
                ),
                grid_cell_deg: parse_or(parse("GRID_CELL_DEG"), defaults.grid_cell_deg),
            },
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}
