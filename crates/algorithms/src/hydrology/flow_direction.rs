//! D8 flow direction
//!
//! Calculates the direction of flow from each cell to its steepest
//! downslope neighbor using the D8 (deterministic eight-node) method.
//! See [`crate::hydrology::d8`] for the direction encoding.

use ndarray::Array2;

use crate::hydrology::d8::{D8_OFFSETS, NO_FLOW};
use crate::maybe_rayon::*;
use relief_core::raster::Raster;
use relief_core::{Algorithm, Error, Result};

/// No-data code for direction rasters produced here. Outside the 0-8
/// range so terminal cells stay distinguishable from missing ones.
const DIR_NODATA: u8 = 255;

/// Distance factors for each D8 direction
const D8_DIST: [f64; 8] = [
    1.0,
    std::f64::consts::SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
    1.0,
    std::f64::consts::SQRT_2,
];

/// Flow direction algorithm (D8)
#[derive(Debug, Clone, Default)]
pub struct FlowDirection;

impl Algorithm for FlowDirection {
    type Input = Raster<f64>;
    type Output = Raster<u8>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Direction (D8)"
    }

    fn description(&self) -> &'static str {
        "Calculate D8 flow direction from a filled DEM"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_direction(&input)
    }
}

/// Calculate D8 flow direction from a DEM.
///
/// The input DEM should ideally be hydrologically conditioned (sinks
/// filled) for meaningful results. Each cell points at the neighbor with
/// the steepest drop per unit distance; pits and flats get
/// [`NO_FLOW`], no-data cells get the output's no-data code (255).
///
/// # Arguments
/// * `dem` - Input DEM (ideally filled)
///
/// # Returns
/// Raster<u8> with flow direction codes
pub fn flow_direction(dem: &Raster<f64>) -> Result<Raster<u8>> {
    let (rows, cols) = dem.shape();
    let cell_size = dem.cell_size();

    let output_data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![NO_FLOW; cols];

            for col in 0..cols {
                let center = unsafe { dem.get_unchecked(row, col) };

                if dem.is_nodata(center) {
                    row_data[col] = DIR_NODATA;
                    continue;
                }

                let mut max_drop = 0.0_f64;
                let mut best_dir = NO_FLOW;

                for (idx, &(dr, dc)) in D8_OFFSETS.iter().enumerate() {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;

                    if !dem.in_grid(nr, nc) {
                        continue;
                    }

                    let neighbor = unsafe { dem.get_unchecked(nr as usize, nc as usize) };
                    if dem.is_nodata(neighbor) {
                        continue;
                    }

                    let distance = D8_DIST[idx] * cell_size;
                    let drop = (center - neighbor) / distance;

                    if drop > max_drop {
                        max_drop = drop;
                        best_dir = (idx + 1) as u8;
                    }
                }

                row_data[col] = best_dir;
            }

            row_data
        })
        .collect();

    let mut output = dem.with_same_meta::<u8>(rows, cols);
    output.set_nodata(Some(DIR_NODATA));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), output_data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
