//! Immutable, grid-indexed fuel station catalog.
//!
//! The catalog is built once from normalized station rows and then only read.
//! Each record carries the 0.5° (by default) cell it falls in, and the catalog
//! keeps a cell -> records index so a lookup touches only the 3x3 block of
//! cells around a point.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::spatial::{CellKey, GridSpec};

/// One row from the station dataset before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRow {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price_per_gallon: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// A deduplicated station with its grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStationRecord {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub price_per_gallon: f64,
    lat_bin: f64,
    lon_bin: f64,
    #[serde(skip)]
    cell: CellKey,
}

impl FuelStationRecord {
    fn new(row: StationRow, lat: f64, lon: f64, grid: &GridSpec) -> Self {
        Self {
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            lat,
            lon,
            price_per_gallon: row.price_per_gallon,
            lat_bin: grid.bin(lat),
            lon_bin: grid.bin(lon),
            cell: grid.cell_of(lat, lon),
        }
    }

    pub fn lat_bin(&self) -> f64 {
        self.lat_bin
    }

    pub fn lon_bin(&self) -> f64 {
        self.lon_bin
    }

    pub fn cell(&self) -> CellKey {
        self.cell
    }

    /// "address, city, state"
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.address, self.city, self.state)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("grid cell size must be a finite positive number of degrees, got {0}")]
    InvalidGrid(f64),
}

/// Summary of what `StationCatalog::from_rows` kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub rows_read: usize,
    /// Stations dropped because none of their rows had coordinates
    pub missing_coordinates: usize,
    pub invalid_price: usize,
    pub duplicates_merged: usize,
}

#[derive(Debug, Clone)]
pub struct StationCatalog {
    grid: GridSpec,
    records: Vec<FuelStationRecord>,
    cells: HashMap<CellKey, Vec<usize>>,
    stats: IngestStats,
}

type StationKey = (String, String, String, String);

/// Rows sharing one station key while the catalog is being built.
struct StationGroup {
    row: StationRow,
    min_price: f64,
    /// Coordinates of the cheapest row that has them, with that row's price
    located: Option<(f64, f64, f64)>,
}

fn finite_coordinates(row: &StationRow) -> Option<(f64, f64)> {
    match (row.lat, row.lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
        _ => None,
    }
}

impl StationGroup {
    fn new(row: StationRow) -> Self {
        let located = finite_coordinates(&row).map(|(lat, lon)| (lat, lon, row.price_per_gallon));
        Self {
            min_price: row.price_per_gallon,
            located,
            row,
        }
    }

    fn merge(&mut self, row: &StationRow) {
        let price = row.price_per_gallon;
        self.min_price = self.min_price.min(price);
        if let Some((lat, lon)) = finite_coordinates(row) {
            let cheaper = match self.located {
                Some((_, _, located_price)) => price < located_price,
                None => true,
            };
            if cheaper {
                self.located = Some((lat, lon, price));
            }
        }
    }
}

impl StationCatalog {
    pub fn empty(grid: GridSpec) -> Self {
        Self {
            grid,
            records: Vec::new(),
            cells: HashMap::new(),
            stats: IngestStats::default(),
        }
    }

    /// Normalize rows into a catalog.
    ///
    /// Rows with a non-finite or negative price are dropped. Rows sharing
    /// `(name, address, city, state)` collapse into one station that takes the
    /// lowest price in the group, even when that row has no coordinates, and
    /// the coordinates of the cheapest row that has them. Stations left with no
    /// finite coordinates are dropped. Output keeps first-occurrence order.
    pub fn from_rows<I>(rows: I, grid: GridSpec) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = StationRow>,
    {
        if !grid.cell_deg.is_finite() || grid.cell_deg <= 0.0 {
            return Err(CatalogError::InvalidGrid(grid.cell_deg));
        }

        let mut stats = IngestStats::default();
        let mut groups: Vec<StationGroup> = Vec::new();
        let mut by_key: HashMap<StationKey, usize> = HashMap::new();

        for row in rows {
            stats.rows_read += 1;
            if !row.price_per_gallon.is_finite() || row.price_per_gallon < 0.0 {
                stats.invalid_price += 1;
                continue;
            }

            let key = (
                row.name.clone(),
                row.address.clone(),
                row.city.clone(),
                row.state.clone(),
            );
            match by_key.get(&key) {
                Some(&idx) => {
                    stats.duplicates_merged += 1;
                    groups[idx].merge(&row);
                }
                None => {
                    by_key.insert(key, groups.len());
                    groups.push(StationGroup::new(row));
                }
            }
        }

        let mut records = Vec::with_capacity(groups.len());
        for group in groups {
            match group.located {
                Some((lat, lon, _)) => {
                    let mut row = group.row;
                    row.price_per_gallon = group.min_price;
                    records.push(FuelStationRecord::new(row, lat, lon, &grid));
                }
                None => stats.missing_coordinates += 1,
            }
        }

        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            cells.entry(record.cell).or_default().push(idx);
        }

        Ok(Self {
            grid,
            records,
            cells,
            stats,
        })
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn records(&self) -> &[FuelStationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Records in the 3x3 block of cells around `(lat, lon)`, in catalog order.
    ///
    /// This is a cell-level filter only; callers refine by exact distance.
    pub fn candidates_near(&self, lat: f64, lon: f64) -> Vec<&FuelStationRecord> {
        let center = self.grid.cell_of(lat, lon);
        let mut indices: Vec<usize> = center
            .neighborhood()
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.iter().map(|&idx| &self.records[idx]).collect()
    }
}
