//! Surface curvature from DEMs
//!
//! Total, planform and profile curvature from the quadric surface of
//! Zevenbergen & Thorne (1987), fitted to the 3×3 neighborhood. The ×100
//! scaling and signs follow the original paper; positive planform
//! indicates diverging flow, positive profile decelerating flow.

use crate::terrain::derivatives::map_attribute;
use relief_core::raster::Raster;
use relief_core::{Algorithm, Error, Result};

/// Which curvature to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurvatureType {
    /// Combined surface curvature: -2(D + E) x 100
    #[default]
    Total,
    /// Curvature perpendicular to the slope direction
    Planform,
    /// Curvature along the direction of maximum slope
    Profile,
}

/// Parameters for curvature calculation
#[derive(Debug, Clone)]
pub struct CurvatureParams {
    /// Type of curvature to compute
    pub curvature_type: CurvatureType,
    /// Elevations are multiplied by this factor before fitting (default 1.0)
    pub z_scale: f64,
}

impl Default for CurvatureParams {
    fn default() -> Self {
        Self {
            curvature_type: CurvatureType::Total,
            z_scale: 1.0,
        }
    }
}

/// Curvature algorithm
#[derive(Debug, Clone, Default)]
pub struct Curvature;

impl Algorithm for Curvature {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = CurvatureParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Curvature"
    }

    fn description(&self) -> &'static str {
        "Calculate surface curvature from a DEM (Zevenbergen & Thorne 1987)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        curvature(&input, params)
    }
}

/// Calculate surface curvature from a DEM
///
/// Fits the Zevenbergen & Thorne (1987) quadric to each 3×3 neighborhood
/// and evaluates the requested curvature. On a locally flat fit
/// (G = H = 0) planform and profile are defined as 0.
///
/// # Arguments
/// * `dem` - Input DEM raster
/// * `params` - Curvature parameters (type, z_scale)
///
/// # Returns
/// Raster with curvature values (NaN no-data)
pub fn curvature(dem: &Raster<f64>, params: CurvatureParams) -> Result<Raster<f64>> {
    let kind = params.curvature_type;

    map_attribute(dem, params.z_scale, move |k| {
        let zt = k.zt_coefficients();

        match kind {
            CurvatureType::Total => -2.0 * (zt.d + zt.e) * 100.0,
            CurvatureType::Planform => {
                if zt.g == 0.0 && zt.h == 0.0 {
                    0.0
                } else {
                    -2.0 * (zt.d * zt.h * zt.h + zt.e * zt.g * zt.g - zt.f * zt.g * zt.h)
                        / (zt.g * zt.g + zt.h * zt.h)
                        * 100.0
                }
            }
            CurvatureType::Profile => {
                if zt.g == 0.0 && zt.h == 0.0 {
                    0.0
                } else {
                    2.0 * (zt.d * zt.g * zt.g + zt.e * zt.h * zt.h + zt.f * zt.g * zt.h)
                        / (zt.g * zt.g + zt.h * zt.h)
                        * 100.0
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use relief_core::GeoTransform;

    fn surface<F: Fn(usize, usize) -> f64>(n: usize, z: F) -> Raster<f64> {
        let mut dem = Raster::new(n, n);
        dem.set_transform(GeoTransform::new(0.0, n as f64, 1.0, -1.0));
        for row in 0..n {
            for col in 0..n {
                dem.set(row, col, z(row, col)).unwrap();
            }
        }
        dem
    }

    fn all_types(dem: &Raster<f64>) -> [Raster<f64>; 3] {
        [
            CurvatureType::Total,
            CurvatureType::Planform,
            CurvatureType::Profile,
        ]
        .map(|curvature_type| {
            curvature(
                dem,
                CurvatureParams {
                    curvature_type,
                    z_scale: 1.0,
                },
            )
            .unwrap()
        })
    }

    #[test]
    fn test_tilted_plane_has_zero_curvature() {
        // Interior cells only: edge replication flattens the stencil at
        // the border, which bends a non-constant plane there.
        let dem = surface(9, |row, col| 2.0 * row as f64 + 5.0 * col as f64);
        for result in all_types(&dem) {
            for row in 1..8 {
                for col in 1..8 {
                    assert_relative_eq!(result.get(row, col).unwrap(), 0.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_constant_surface_has_zero_curvature() {
        let dem = surface(5, |_, _| 10.0);
        for result in all_types(&dem) {
            assert_eq!(result.get(2, 2).unwrap(), 0.0);
            // Edges included, through center replication
            assert_eq!(result.get(0, 0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_bowl_total_curvature() {
        // z = x² + y² around the center: D = E = 1, so total = -400
        let dem = surface(9, |row, col| {
            let x = col as f64 - 4.0;
            let y = row as f64 - 4.0;
            x * x + y * y
        });

        let result = curvature(&dem, CurvatureParams::default()).unwrap();
        assert_relative_eq!(result.get(4, 4).unwrap(), -400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bowl_center_directional_curvatures_zero() {
        // At the bowl's bottom the first derivatives vanish, so the
        // directional curvatures take their flat-fit value of 0.
        let dem = surface(9, |row, col| {
            let x = col as f64 - 4.0;
            let y = row as f64 - 4.0;
            x * x + y * y
        });

        let planform = curvature(
            &dem,
            CurvatureParams {
                curvature_type: CurvatureType::Planform,
                z_scale: 1.0,
            },
        )
        .unwrap();
        let profile = curvature(
            &dem,
            CurvatureParams {
                curvature_type: CurvatureType::Profile,
                z_scale: 1.0,
            },
        )
        .unwrap();

        assert_eq!(planform.get(4, 4).unwrap(), 0.0);
        assert_eq!(profile.get(4, 4).unwrap(), 0.0);
    }

    #[test]
    fn test_valley_profile_curvature() {
        // Parabolic valley z = x², descending nowhere along y: off-axis
        // cells slope toward the trough, and the surface is concave along
        // that slope. G = 2x, H = 0, D = 1 → profile = 2·D·100 = 200.
        let dem = surface(9, |_, col| {
            let x = col as f64 - 4.0;
            x * x
        });

        let profile = curvature(
            &dem,
            CurvatureParams {
                curvature_type: CurvatureType::Profile,
                z_scale: 1.0,
            },
        )
        .unwrap();

        assert_relative_eq!(profile.get(4, 2).unwrap(), 200.0, epsilon = 1e-9);
        assert_relative_eq!(profile.get(4, 6).unwrap(), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nodata_center_propagates() {
        let mut dem = surface(5, |row, col| (row + col) as f64);
        dem.set(2, 2, f64::NAN).unwrap();

        let result = curvature(&dem, CurvatureParams::default()).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
    }
}
