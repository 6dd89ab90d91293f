//! Stream Power Index (SPI) and Compound Topographic Index (CTI)
//!
//! SPI = ln((A / cell_area) x (S + 0.001))
//! CTI = ln((A / cell_area) / (S + 0.001))
//!
//! where A is flow accumulation (cell counts) and S percent slope.
//! High SPI flags erosive power; high CTI flags wetness-prone cells.

use ndarray::Array2;

use crate::maybe_rayon::*;
use relief_core::raster::Raster;
use relief_core::{Error, Result};

/// No-data sentinel for the index rasters. ln never produces it for the
/// positive arguments the formulas assume, so it cannot collide.
const INDEX_NODATA: f64 = -1.0;

/// Compute the Stream Power Index.
///
/// SPI = ln((A / cell_area) x (S + 0.001))
///
/// Both rasters must have the same shape. No-data in either input yields
/// the output sentinel (-1.0). Non-positive log arguments are the
/// caller's responsibility; they are not masked here.
///
/// # Arguments
/// * `flow_acc` - Flow accumulation raster (cell counts)
/// * `percent_slope` - Slope raster in percent
pub fn spi(flow_acc: &Raster<f64>, percent_slope: &Raster<f64>) -> Result<Raster<f64>> {
    composite_index(flow_acc, percent_slope, |sca, s| (sca * (s + 0.001)).ln())
}

/// Compute the Compound Topographic Index (topographic wetness).
///
/// CTI = ln((A / cell_area) / (S + 0.001))
///
/// Both rasters must have the same shape. No-data in either input yields
/// the output sentinel (-1.0).
///
/// # Arguments
/// * `flow_acc` - Flow accumulation raster (cell counts)
/// * `percent_slope` - Slope raster in percent
pub fn cti(flow_acc: &Raster<f64>, percent_slope: &Raster<f64>) -> Result<Raster<f64>> {
    composite_index(flow_acc, percent_slope, |sca, s| (sca / (s + 0.001)).ln())
}

fn composite_index<F>(
    flow_acc: &Raster<f64>,
    percent_slope: &Raster<f64>,
    index: F,
) -> Result<Raster<f64>>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    let (rows_a, cols_a) = flow_acc.shape();
    let (rows_s, cols_s) = percent_slope.shape();

    if rows_a != rows_s || cols_a != cols_s {
        return Err(Error::SizeMismatch {
            er: rows_a,
            ec: cols_a,
            ar: rows_s,
            ac: cols_s,
        });
    }

    let rows = rows_a;
    let cols = cols_a;
    let cell_area = flow_acc.cell_area();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![INDEX_NODATA; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let acc = unsafe { flow_acc.get_unchecked(row, col) };
                let slp = unsafe { percent_slope.get_unchecked(row, col) };

                if flow_acc.is_nodata(acc) || percent_slope.is_nodata(slp) {
                    continue;
                }

                *out = index(acc / cell_area, slp);
            }

            row_data
        })
        .collect();

    let mut output = flow_acc.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(INDEX_NODATA));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), output_data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
