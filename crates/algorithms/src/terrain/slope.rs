//! Slope calculation from DEMs
//!
//! Calculates the rate of change of elevation using the Horn (1981) method,
//! which fits a surface to the 3x3 neighborhood and takes the slope along
//! the direction of maximum gradient.

use crate::terrain::derivatives::map_attribute;
use relief_core::raster::Raster;
use relief_core::{Algorithm, Error, Result};

/// Units for slope output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeUnits {
    /// Rise over run (0-infinity); the base quantity the other units
    /// derive from
    #[default]
    RiseRun,
    /// Percent (= 100 x rise/run)
    Percent,
    /// Degrees (0-90)
    Degrees,
    /// Radians (0-π/2)
    Radians,
}

/// Parameters for slope calculation
#[derive(Debug, Clone)]
pub struct SlopeParams {
    /// Output units
    pub units: SlopeUnits,
    /// Elevations are multiplied by this factor before the gradient is
    /// taken (default 1.0). Use ~111320 for lat/lon DEMs with meters
    /// elevation.
    pub z_scale: f64,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self {
            units: SlopeUnits::RiseRun,
            z_scale: 1.0,
        }
    }
}

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Calculate slope (rate of change of elevation) from a DEM using Horn's method"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope(&input, params)
    }
}

/// Calculate slope from a DEM
///
/// Uses Horn's (1981) method:
///
/// dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * cell_length_x)
/// dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 * cell_length_y)
/// rise/run = sqrt(dz/dx² + dz/dy²)
///
/// # Arguments
/// * `dem` - Input DEM raster
/// * `params` - Slope calculation parameters
///
/// # Returns
/// Raster with slope values in the specified units (NaN no-data)
pub fn slope(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    let units = params.units;

    map_attribute(dem, params.z_scale, move |k| {
        let dzdx = k.dzdx();
        let dzdy = k.dzdy();
        let riserun = (dzdx * dzdx + dzdy * dzdy).sqrt();

        match units {
            SlopeUnits::RiseRun => riserun,
            SlopeUnits::Percent => riserun * 100.0,
            SlopeUnits::Degrees => riserun.atan().to_degrees(),
            SlopeUnits::Radians => riserun.atan(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use relief_core::GeoTransform;

    /// Plane rising westward by 3 per cell: descent is due east, rise/run 3
    fn east_descending() -> Raster<f64> {
        let mut dem = Raster::new(5, 5);
        dem.set_transform(GeoTransform::new(0.0, 5.0, 1.0, -1.0));
        for row in 0..5 {
            for col in 0..5 {
                dem.set(row, col, -3.0 * col as f64).unwrap();
            }
        }
        dem
    }

    #[test]
    fn test_slope_planar() {
        let dem = east_descending();
        let result = slope(&dem, SlopeParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slope_flat_everywhere_including_edges() {
        let mut dem: Raster<f64> = Raster::filled(10, 10, 100.0);
        dem.set_transform(GeoTransform::new(0.0, 10.0, 1.0, -1.0));

        let result = slope(&dem, SlopeParams::default()).unwrap();
        // Edge replication makes border cells well-defined too
        for row in 0..10 {
            for col in 0..10 {
                assert_eq!(result.get(row, col).unwrap(), 0.0, "({row}, {col})");
            }
        }
    }

    #[test]
    fn test_slope_edge_replication_halves_gradient() {
        // On the west edge the a/d/g column collapses onto the center,
        // so only the eastern half of the stencil contributes.
        let dem = east_descending();
        let result = slope(&dem, SlopeParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 0).unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_slope_units_consistent() {
        let dem = east_descending();

        let riserun = slope(&dem, SlopeParams::default()).unwrap();
        let percent = slope(
            &dem,
            SlopeParams {
                units: SlopeUnits::Percent,
                z_scale: 1.0,
            },
        )
        .unwrap();
        let radians = slope(
            &dem,
            SlopeParams {
                units: SlopeUnits::Radians,
                z_scale: 1.0,
            },
        )
        .unwrap();
        let degrees = slope(
            &dem,
            SlopeParams {
                units: SlopeUnits::Degrees,
                z_scale: 1.0,
            },
        )
        .unwrap();

        for row in 0..5 {
            for col in 0..5 {
                let rr = riserun.get(row, col).unwrap();
                let pct = percent.get(row, col).unwrap();
                let rad = radians.get(row, col).unwrap();
                let deg = degrees.get(row, col).unwrap();

                assert_relative_eq!(pct, rr * 100.0, epsilon = 1e-12);
                assert_relative_eq!(rad.tan(), rr, epsilon = 1e-12);
                assert_relative_eq!(deg, rad.to_degrees(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_slope_z_scale() {
        let dem = east_descending();
        let result = slope(
            &dem,
            SlopeParams {
                units: SlopeUnits::RiseRun,
                z_scale: 2.0,
            },
        )
        .unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_slope_rectangular_cells_use_both_lengths() {
        // Same surface, but Y cells twice as long: dz/dy shrinks, dz/dx
        // is unaffected.
        let mut dem = Raster::new(5, 5);
        dem.set_transform(GeoTransform::new(0.0, 5.0, 1.0, -2.0));
        for row in 0..5 {
            for col in 0..5 {
                dem.set(row, col, -3.0 * row as f64).unwrap();
            }
        }

        let result = slope(&dem, SlopeParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_slope_nodata_center() {
        let mut dem = east_descending();
        dem.set(2, 2, f64::NAN).unwrap();

        let result = slope(&dem, SlopeParams::default()).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        // Neighbors of the hole still compute, with the hole replicated
        assert!(result.get(2, 1).unwrap().is_finite());
    }
}
