//! Station dataset ingestion and the city/state place index built from it.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use fuelstop_core::{GridSpec, StationCatalog, StationRow};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::geocoding::{normalize_address, Coordinates};

/// One line of the fuel price CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvStation {
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Retail Price")]
    price: f64,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    lon: Option<f64>,
}

impl From<CsvStation> for StationRow {
    fn from(row: CsvStation) -> Self {
        StationRow {
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            price_per_gallon: row.price,
            lat: row.lat,
            lon: row.lon,
        }
    }
}

/// Parse station rows, skipping lines that don't deserialize.
///
/// Returns the rows and the number of skipped lines.
pub fn read_station_rows<R: Read>(reader: R) -> Result<(Vec<StationRow>, usize)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.deserialize::<CsvStation>().enumerate() {
        match result {
            Ok(row) => rows.push(row.into()),
            Err(err) => {
                if let csv::ErrorKind::Io(_) = err.kind() {
                    return Err(err).context("failed to read station CSV");
                }
                tracing::debug!(line = line + 2, "skipping malformed station row: {}", err);
                skipped += 1;
            }
        }
    }
    Ok((rows, skipped))
}

/// Load and normalize the station CSV at `path` into a catalog.
pub fn load_catalog<P: AsRef<Path>>(path: P, grid: GridSpec) -> Result<StationCatalog> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open station dataset {}", path.display()))?;
    let (rows, skipped) = read_station_rows(file)?;
    if skipped > 0 {
        tracing::warn!("Skipped {} malformed rows in {}", skipped, path.display());
    }

    let catalog = StationCatalog::from_rows(rows, grid)?;
    let stats = catalog.stats();
    tracing::info!(
        rows = stats.rows_read,
        missing_coordinates = stats.missing_coordinates,
        duplicates = stats.duplicates_merged,
        "Loaded {} fuel stations with coordinates.",
        catalog.len()
    );
    Ok(catalog)
}

/// "city, state" -> coordinates of the first catalog station in that city.
#[derive(Debug, Clone, Default)]
pub struct PlaceIndex {
    places: HashMap<String, Coordinates>,
}

impl PlaceIndex {
    pub fn from_catalog(catalog: &StationCatalog) -> Self {
        let mut places = HashMap::new();
        for record in catalog.records() {
            let key = normalize_address(&format!("{}, {}", record.city.trim(), record.state.trim()));
            places.entry(key).or_insert(Coordinates {
                lat: record.lat,
                lon: record.lon,
            });
        }
        Self { places }
    }

    /// Look up an already normalized address.
    pub fn lookup(&self, normalized_address: &str) -> Option<Coordinates> {
        self.places.get(normalized_address).copied()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
