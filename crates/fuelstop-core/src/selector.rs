//! Cheapest-station selection around each refuel point.

use serde::{Deserialize, Serialize};

use crate::catalog::{FuelStationRecord, StationCatalog};
use crate::models::{ConstantGallonsPerStop, RefuelPoint, RefuelStop};
use crate::rules::PlannerConfig;
use crate::spatial::haversine_miles;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopSelection {
    pub stops: Vec<RefuelStop>,
    pub total_cost: f64,
}

/// Cheapest station within the search radius of `point`.
///
/// Candidates come from the 3x3 cell block around the point, are refined by
/// exact distance, and ties on price keep the first candidate in catalog order.
pub fn cheapest_station_near<'a>(
    point: &RefuelPoint,
    catalog: &'a StationCatalog,
    search_radius_miles: f64,
) -> Option<(&'a FuelStationRecord, f64)> {
    let mut best: Option<(&FuelStationRecord, f64)> = None;
    for record in catalog.candidates_near(point.lat, point.lon) {
        let distance = haversine_miles(point.lat, point.lon, record.lat, record.lon);
        if distance > search_radius_miles {
            continue;
        }
        let cheaper = match best {
            Some((current, _)) => record.price_per_gallon < current.price_per_gallon,
            None => true,
        };
        if cheaper {
            best = Some((record, distance));
        }
    }
    best
}

/// Bind each refuel point to its cheapest reachable station.
///
/// Points with no station in range are skipped, so the result may be shorter
/// than `points`. Every stop buys `ConstantGallonsPerStop` gallons.
pub fn select_stations(
    points: &[RefuelPoint],
    catalog: &StationCatalog,
    config: &PlannerConfig,
) -> StopSelection {
    let gallons = ConstantGallonsPerStop::from_range(config.max_range_miles, config.mpg).gallons();
    let mut selection = StopSelection::default();
    if catalog.is_empty() {
        return selection;
    }

    for point in points {
        let Some((station, distance_miles)) =
            cheapest_station_near(point, catalog, config.search_radius_miles)
        else {
            tracing::debug!(
                trace_index = point.trace_index,
                lat = point.lat,
                lon = point.lon,
                "no station within search radius"
            );
            continue;
        };

        let stop = RefuelStop {
            station_name: station.name.clone(),
            station_address: station.full_address(),
            station_lat: station.lat,
            station_lon: station.lon,
            price_per_gallon: station.price_per_gallon,
            gallons,
            distance_miles,
        };
        selection.total_cost += stop.cost();
        selection.stops.push(stop);
    }

    selection
}
