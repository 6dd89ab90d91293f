//! 3×3 neighborhood sampling and finite differences
//!
//! Every terrain attribute is a pointwise function of the neighborhood
//!
//! ```text
//! a b c
//! d e f
//! g h i
//! ```
//!
//! around a center cell `e`. Off-grid or no-data neighbors take the center
//! value, and all nine values are scaled by the vertical exaggeration
//! factor before use.

use crate::maybe_rayon::*;
use ndarray::Array2;
use relief_core::raster::Raster;
use relief_core::{Error, Result};

/// Sampled and scaled 3×3 neighborhood.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kernel3x3 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
    pub h: f64,
    pub i: f64,
    pub len_x: f64,
    pub len_y: f64,
}

impl Kernel3x3 {
    /// Sample the neighborhood of (row, col).
    ///
    /// The center must be a data cell; callers are expected to go through
    /// [`map_attribute`], which guarantees it.
    pub fn sample(dem: &Raster<f64>, row: usize, col: usize, z_scale: f64) -> Self {
        let e = unsafe { dem.get_unchecked(row, col) };
        let r = row as isize;
        let c = col as isize;

        let mut k = Self {
            a: Self::pick(dem, r - 1, c - 1, e),
            b: Self::pick(dem, r - 1, c, e),
            c: Self::pick(dem, r - 1, c + 1, e),
            d: Self::pick(dem, r, c - 1, e),
            e,
            f: Self::pick(dem, r, c + 1, e),
            g: Self::pick(dem, r + 1, c - 1, e),
            h: Self::pick(dem, r + 1, c, e),
            i: Self::pick(dem, r + 1, c + 1, e),
            len_x: dem.cell_length_x(),
            len_y: dem.cell_length_y(),
        };

        k.a *= z_scale;
        k.b *= z_scale;
        k.c *= z_scale;
        k.d *= z_scale;
        k.e *= z_scale;
        k.f *= z_scale;
        k.g *= z_scale;
        k.h *= z_scale;
        k.i *= z_scale;

        k
    }

    fn pick(dem: &Raster<f64>, row: isize, col: isize, center: f64) -> f64 {
        if dem.in_grid(row, col) {
            let v = unsafe { dem.get_unchecked(row as usize, col as usize) };
            if !dem.is_nodata(v) {
                return v;
            }
        }
        center
    }

    /// West-east gradient of the fitted surface (Horn 1981, p. 18)
    pub fn dzdx(&self) -> f64 {
        ((self.c + 2.0 * self.f + self.i) - (self.a + 2.0 * self.d + self.g)) / (8.0 * self.len_x)
    }

    /// North-south gradient of the fitted surface (Horn 1981, p. 18)
    pub fn dzdy(&self) -> f64 {
        ((self.g + 2.0 * self.h + self.i) - (self.a + 2.0 * self.b + self.c)) / (8.0 * self.len_y)
    }

    /// Quadric coefficients of Zevenbergen & Thorne (1987), using the
    /// X cell length as the grid spacing L.
    pub fn zt_coefficients(&self) -> ZtCoefficients {
        let l = self.len_x;
        let l2 = l * l;

        ZtCoefficients {
            d: ((self.d + self.f) / 2.0 - self.e) / l2,
            e: ((self.b + self.h) / 2.0 - self.e) / l2,
            f: (-self.a + self.c + self.g - self.i) / (4.0 * l2),
            g: (-self.d + self.f) / (2.0 * l),
            h: (self.b - self.h) / (2.0 * l),
        }
    }
}

/// Second-order surface coefficients in the nomenclature of Zevenbergen &
/// Thorne (1987): D and E are the axis-aligned second derivatives, F the
/// cross term, G and H the first derivatives.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ZtCoefficients {
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
    pub h: f64,
}

/// Drive a pointwise attribute over every cell of the DEM.
///
/// Rows are processed in parallel. No-data centers produce the output
/// no-data (NaN); all other cells are handed to `op` as a sampled kernel.
/// The output adopts the DEM's shape and geotransform.
pub(crate) fn map_attribute<F>(dem: &Raster<f64>, z_scale: f64, op: F) -> Result<Raster<f64>>
where
    F: Fn(&Kernel3x3) -> f64 + Send + Sync,
{
    let (rows, cols) = dem.shape();

    if (dem.cell_length_x() - dem.cell_length_y()).abs() > f64::EPSILON {
        log::warn!(
            "cell X and Y dimensions are not equal ({} vs {})",
            dem.cell_length_x(),
            dem.cell_length_y()
        );
    }

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let center = unsafe { dem.get_unchecked(row, col) };
                if dem.is_nodata(center) {
                    continue;
                }

                let kernel = Kernel3x3::sample(dem, row, col, z_scale);
                *out = op(&kernel);
            }

            row_data
        })
        .collect();

    let mut output = dem.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), output_data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
