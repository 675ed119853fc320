//! Planner constants: vehicle range, station search radius and walk tuning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::GridSpec;

/// Configuration for refuel planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Miles the vehicle can cover on a full tank
    pub max_range_miles: f64,
    /// Exact-distance cutoff for candidate stations around a refuel point
    pub search_radius_miles: f64,
    /// Vehicle fuel economy
    pub mpg: f64,
    /// Only every `stride`-th route point is sampled
    pub stride: usize,
    /// Number of stride samples scanned after a trigger
    pub lookahead_window: usize,
    /// Accumulated distance (fraction of range) that starts a lookahead
    pub trigger_fraction: f64,
    /// Candidates at or beyond this fraction of range are skipped
    pub accept_fraction: f64,
    /// Station grid cell size in degrees
    pub grid_cell_deg: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_range_miles: 500.0,
            search_radius_miles: 10.0,
            mpg: 10.0,
            stride: 10,
            lookahead_window: 20,
            trigger_fraction: 0.8,
            accept_fraction: 0.9,
            grid_cell_deg: 0.5,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be in (0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
}

impl PlannerConfig {
    pub fn trigger_miles(&self) -> f64 {
        self.max_range_miles * self.trigger_fraction
    }

    pub fn accept_limit_miles(&self) -> f64 {
        self.max_range_miles * self.accept_fraction
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.grid_cell_deg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_range_miles", self.max_range_miles),
            ("search_radius_miles", self.search_radius_miles),
            ("mpg", self.mpg),
            ("grid_cell_deg", self.grid_cell_deg),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("trigger_fraction", self.trigger_fraction),
            ("accept_fraction", self.accept_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::FractionOutOfRange { field, value });
            }
        }
        if self.stride == 0 {
            return Err(ConfigError::ZeroCount { field: "stride" });
        }
        if self.lookahead_window == 0 {
            return Err(ConfigError::ZeroCount {
                field: "lookahead_window",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PlannerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.trigger_miles(), 400.0);
        assert_eq!(config.accept_limit_miles(), 450.0);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = PlannerConfig {
            mpg: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "mpg", .. })
        ));

        config.mpg = 10.0;
        config.accept_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange { field: "accept_fraction", .. })
        ));

        config.accept_fraction = 0.9;
        config.stride = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount { field: "stride" })
        );
    }

    #[test]
    fn rejects_nan_range() {
        let config = PlannerConfig {
            max_range_miles: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
