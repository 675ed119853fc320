//! Spatial math for range segmentation and station lookup.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MI: f64 = 3_958.8;
pub const METERS_PER_MILE: f64 = 1_609.34;

/// Great-circle distance in statute miles (haversine).
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    EARTH_RADIUS_MI * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Offset a position by a distance in miles along a bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_mi` - Distance in miles
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing_miles(lat: f64, lon: f64, distance_mi: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_mi.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_mi / EARTH_RADIUS_MI;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

// ==== Grid binning ====
// Stations are bucketed into fixed-size lat/lon cells so a lookup only has to
// look at the 3x3 block of cells around a point before exact distances.

/// Fixed-size lat/lon grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cell_deg: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { cell_deg: 0.5 }
    }
}

/// Integer coordinates of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub lat: i64,
    pub lon: i64,
}

impl GridSpec {
    pub fn new(cell_deg: f64) -> Self {
        Self { cell_deg }
    }

    /// Index of the cell containing `coord` along one axis.
    pub fn cell_index(&self, coord: f64) -> i64 {
        (coord / self.cell_deg).floor() as i64
    }

    /// Lower edge of the cell containing `coord` (`floor(coord*2)/2` for 0.5°).
    pub fn bin(&self, coord: f64) -> f64 {
        (coord / self.cell_deg).floor() * self.cell_deg
    }

    pub fn cell_of(&self, lat: f64, lon: f64) -> CellKey {
        CellKey {
            lat: self.cell_index(lat),
            lon: self.cell_index(lon),
        }
    }
}

impl CellKey {
    /// This cell and its eight neighbours, row by row from the south-west.
    pub fn neighborhood(self) -> impl Iterator<Item = CellKey> {
        (-1..=1).flat_map(move |dlat| {
            (-1..=1).map(move |dlon| CellKey {
                lat: self.lat + dlat,
                lon: self.lon + dlon,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_miles_one_degree() {
        let dist = haversine_miles(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 69.09).abs() < 0.1, "got {dist}");
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_miles(39.7392, -104.9903, 39.7392, -104.9903);
        assert!(dist < 1e-9);
    }

    #[test]
    fn offset_round_trips_through_haversine() {
        let (lat, lon) = offset_by_bearing_miles(35.0, -100.0, 12.5, std::f64::consts::FRAC_PI_2);
        let dist = haversine_miles(35.0, -100.0, lat, lon);
        assert!((dist - 12.5).abs() < 1e-6, "got {dist}");
    }

    #[test]
    fn bin_matches_half_degree_floor() {
        let grid = GridSpec::default();
        for coord in [-104.99, -0.25, 0.0, 0.49, 0.5, 39.74, 40.0, 89.99] {
            let expected = (coord * 2.0_f64).floor() / 2.0;
            assert_eq!(grid.bin(coord), expected, "coord {coord}");
        }
    }

    #[test]
    fn negative_coordinates_floor_toward_south_west() {
        let grid = GridSpec::default();
        assert_eq!(grid.cell_index(-0.1), -1);
        assert_eq!(grid.bin(-0.1), -0.5);
        assert_eq!(grid.cell_index(-104.2), -209);
    }

    #[test]
    fn neighborhood_is_three_by_three() {
        let center = CellKey { lat: 79, lon: -210 };
        let cells: Vec<CellKey> = center.neighborhood().collect();
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&center));
        assert!(cells
            .iter()
            .all(|cell| (cell.lat - center.lat).abs() <= 1 && (cell.lon - center.lon).abs() <= 1));
        assert!(!cells.contains(&CellKey { lat: 81, lon: -210 }));
    }
}
