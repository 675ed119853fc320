//! End-to-end refuel plan: segmentation followed by station selection.

use serde::{Deserialize, Serialize};

use crate::catalog::StationCatalog;
use crate::models::{Coverage, RefuelPoint, RefuelStop, RouteTrace};
use crate::rules::PlannerConfig;
use crate::segmenter::segment_route;
use crate::selector::select_stations;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelPlan {
    pub refuel_points: Vec<RefuelPoint>,
    pub stops: Vec<RefuelStop>,
    pub total_cost: f64,
    pub coverage: Coverage,
}

impl FuelPlan {
    /// Refuel points that got no station within the search radius.
    pub fn unserved_points(&self) -> usize {
        self.refuel_points.len().saturating_sub(self.stops.len())
    }
}

/// Plan refuel stops for `trace` against a shared, read-only catalog.
///
/// Pure function of its inputs; safe to call from any number of workers.
/// Station lookup uses the grid the catalog was built with, which must match
/// `config.grid_cell_deg`.
pub fn plan_fuel_stops(
    trace: &RouteTrace,
    catalog: &StationCatalog,
    config: &PlannerConfig,
) -> FuelPlan {
    debug_assert_eq!(
        catalog.grid(),
        config.grid(),
        "catalog grid differs from planner grid_cell_deg"
    );
    let segmentation = segment_route(trace, config);
    let selection = select_stations(&segmentation.points, catalog, config);
    FuelPlan {
        refuel_points: segmentation.points,
        stops: selection.stops,
        total_cost: selection.total_cost,
        coverage: segmentation.coverage,
    }
}
