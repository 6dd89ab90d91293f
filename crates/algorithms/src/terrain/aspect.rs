//! Aspect calculation from DEMs
//!
//! Calculates the compass direction of steepest descent using the Horn
//! (1981) gradients: 0° = north, increasing clockwise, in [0, 360).

use crate::terrain::derivatives::map_attribute;
use relief_core::raster::Raster;
use relief_core::{Algorithm, Error, Result};

/// Parameters for aspect calculation
#[derive(Debug, Clone)]
pub struct AspectParams {
    /// Elevations are multiplied by this factor before the gradient is
    /// taken (default 1.0)
    pub z_scale: f64,
}

impl Default for AspectParams {
    fn default() -> Self {
        Self { z_scale: 1.0 }
    }
}

/// Aspect algorithm
#[derive(Debug, Clone, Default)]
pub struct Aspect;

impl Algorithm for Aspect {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = AspectParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Aspect"
    }

    fn description(&self) -> &'static str {
        "Calculate aspect (direction of steepest descent) from a DEM"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        aspect(&input, params)
    }
}

/// Calculate aspect from a DEM
///
/// Uses Horn's (1981) gradients. Aspect is measured clockwise from north:
/// - 0° = North
/// - 90° = East
/// - 180° = South
/// - 270° = West
///
/// A perfectly flat neighborhood yields 0.
///
/// # Arguments
/// * `dem` - Input DEM raster
/// * `params` - Aspect parameters
///
/// # Returns
/// Raster with aspect in degrees (NaN no-data)
pub fn aspect(dem: &Raster<f64>, params: AspectParams) -> Result<Raster<f64>> {
    map_attribute(dem, params.z_scale, |k| {
        let dzdx = k.dzdx();
        let dzdy = k.dzdy();

        if dzdx == 0.0 && dzdy == 0.0 {
            return 0.0;
        }

        let theta = dzdy.atan2(-dzdx).to_degrees();
        if theta < 0.0 {
            90.0 - theta
        } else if theta > 90.0 {
            360.0 - theta + 90.0
        } else {
            90.0 - theta
        }
    })
}
