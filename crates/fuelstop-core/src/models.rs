//! Core data models for refuel planning.

use serde::{Deserialize, Serialize};

/// One sample of a route polyline, always in (lat, lon) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}

impl RoutePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON position, which is (lon, lat).
    pub fn from_lon_lat(position: [f64; 2]) -> Self {
        Self {
            lat: position[1],
            lon: position[0],
        }
    }
}

/// Ordered route polyline; index order is travel order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTrace {
    points: Vec<RoutePoint>,
}

impl RouteTrace {
    pub fn new(points: Vec<RoutePoint>) -> Self {
        Self { points }
    }

    /// Swap GeoJSON `[lon, lat]` positions into route order.
    pub fn from_geojson_coordinates(coordinates: &[[f64; 2]]) -> Self {
        Self {
            points: coordinates.iter().copied().map(RoutePoint::from_lon_lat).collect(),
        }
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&RoutePoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<RoutePoint>> for RouteTrace {
    fn from(points: Vec<RoutePoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<RoutePoint> for RouteTrace {
    fn from_iter<I: IntoIterator<Item = RoutePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A route sample where the vehicle has to stop for fuel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefuelPoint {
    /// Index into the originating `RouteTrace`
    pub trace_index: usize,
    pub lat: f64,
    pub lon: f64,
}

/// The station chosen for one refuel point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefuelStop {
    pub station_name: String,
    /// "address, city, state"
    pub station_address: String,
    pub station_lat: f64,
    pub station_lon: f64,
    pub price_per_gallon: f64,
    pub gallons: f64,
    /// Exact distance from the refuel point to the station
    pub distance_miles: f64,
}

impl RefuelStop {
    pub fn cost(&self) -> f64 {
        self.gallons * self.price_per_gallon
    }
}

/// Every stop buys a full range worth of fuel (`range / mpg`), whatever
/// distance was actually driven since the previous stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantGallonsPerStop {
    gallons: f64,
}

impl ConstantGallonsPerStop {
    pub fn from_range(max_range_miles: f64, mpg: f64) -> Self {
        Self {
            gallons: max_range_miles / mpg,
        }
    }

    pub fn gallons(&self) -> f64 {
        self.gallons
    }
}

/// How far down the route the segmenter was able to plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum Coverage {
    /// The walk reached the end of the trace. This includes a trigger on the
    /// last stride sample: the trace ends before any lookahead candidate, so
    /// fewer than `stride` trailing points remain unexamined and no further
    /// stop is planned even though the trigger distance was reached.
    #[default]
    Complete,
    /// A lookahead found no sample inside the accept limit; nothing past
    /// `trace_index` was considered.
    Truncated { trace_index: usize },
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        matches!(self, Coverage::Complete)
    }
}
