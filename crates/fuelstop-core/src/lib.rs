pub mod catalog;
pub mod models;
pub mod planner;
pub mod rules;
pub mod segmenter;
pub mod selector;
pub mod spatial;

pub use catalog::{CatalogError, FuelStationRecord, IngestStats, StationCatalog, StationRow};
pub use models::{ConstantGallonsPerStop, Coverage, RefuelPoint, RefuelStop, RoutePoint, RouteTrace};
pub use planner::{plan_fuel_stops, FuelPlan};
pub use rules::{ConfigError, PlannerConfig};
pub use segmenter::{segment_route, Segmentation};
pub use selector::{cheapest_station_near, select_stations, StopSelection};
pub use spatial::{haversine_miles, GridSpec, METERS_PER_MILE};
