//! D8 flow accumulation
//!
//! Converts a D8 flow-direction raster into an upslope-area raster by
//! counting each cell's dependencies on its neighbors and draining cells
//! top-of-the-watershed-down once all their contributors have been
//! processed. Cells caught in direction cycles can never be drained and
//! are reported as a diagnostic count.

use ndarray::Array2;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::hydrology::d8::{offset, NO_FLOW};
use crate::maybe_rayon::*;
use relief_core::raster::Raster;
use relief_core::{Algorithm, Error, Result};

/// No-data sentinel for the area raster. Accumulated counts are always
/// positive, so a negative sentinel cannot collide with them.
const AREA_NODATA: f64 = -1.0;

/// Output of [`flow_accumulation`].
#[derive(Debug, Clone)]
pub struct FlowAccumResult {
    /// Upslope area per cell, counting the cell itself. A headwater cell
    /// holds 1; a terminal cell holds the size of its basin.
    pub area: Raster<f64>,
    /// Number of data cells whose dependency count never reached zero,
    /// i.e. cells caught in a direction cycle. Zero for well-formed input.
    pub cycle_cells: usize,
}

/// Flow accumulation algorithm (D8)
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulation;

impl Algorithm for FlowAccumulation {
    type Input = Raster<u8>;
    type Output = FlowAccumResult;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Accumulation (D8)"
    }

    fn description(&self) -> &'static str {
        "Calculate upslope contributing area from D8 flow direction"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_accumulation(&input)
    }
}

/// Calculate flow accumulation from a D8 flow direction raster.
///
/// Each cell receives the count of all cells whose flow path passes
/// through it, including itself.
///
/// # Algorithm
/// 1. Count incoming flows for each cell (row-parallel; the increments
///    cross row boundaries and are atomic)
/// 2. Seed a queue with every data cell of in-degree 0
/// 3. Drain downstream, accumulating counts; a cell enters the queue
///    exactly when its last contributor has been processed
///
/// The drain order is not significant: any order that processes a cell
/// after all of its contributors yields the same area raster.
///
/// # Arguments
/// * `flow_dir` - D8 flow direction raster (see [`crate::hydrology::d8`])
///
/// # Returns
/// [`FlowAccumResult`] with the area raster (no-data -1.0 wherever the
/// direction raster holds no-data) and the cycle-cell count.
pub fn flow_accumulation(flow_dir: &Raster<u8>) -> Result<FlowAccumResult> {
    let (rows, cols) = flow_dir.shape();

    let dependency: Vec<AtomicU8> = std::iter::repeat_with(|| AtomicU8::new(0))
        .take(rows * cols)
        .collect();

    // Pass 1: initialize the area grid and count dependencies. Area writes
    // stay within the closure's own row; dependency increments may target
    // any row and go through the atomics.
    let area_init: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_area = vec![0.0_f64; cols];

            for col in 0..cols {
                let dir = unsafe { flow_dir.get_unchecked(row, col) };

                if flow_dir.is_nodata(dir) {
                    row_area[col] = AREA_NODATA;
                    continue;
                }
                if dir == NO_FLOW || dir > 8 {
                    continue;
                }

                let (dr, dc) = offset(dir);
                let nr = row as isize + dr;
                let nc = col as isize + dc;

                // Cells that flow off the grid contribute nothing.
                if flow_dir.in_grid(nr, nc) {
                    let idx = nr as usize * cols + nc as usize;
                    dependency[idx].fetch_add(1, Ordering::Relaxed);
                }
            }

            row_area
        })
        .collect();

    let mut dependency: Vec<u8> = dependency.into_iter().map(AtomicU8::into_inner).collect();
    let mut area = Array2::from_shape_vec((rows, cols), area_init)
        .map_err(|e| Error::Other(e.to_string()))?;

    // Pass 2: every data cell nothing flows into is a source.
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    for row in 0..rows {
        for col in 0..cols {
            let dir = unsafe { flow_dir.get_unchecked(row, col) };
            if !flow_dir.is_nodata(dir) && dependency[row * cols + col] == 0 {
                queue.push_back((row, col));
            }
        }
    }

    // Pass 3: drain. Each cell counts itself, then hands its total to its
    // downstream neighbor.
    while let Some((row, col)) = queue.pop_front() {
        area[(row, col)] += 1.0;

        let dir = unsafe { flow_dir.get_unchecked(row, col) };
        if dir == NO_FLOW || dir > 8 {
            continue;
        }

        let (dr, dc) = offset(dir);
        let nr = row as isize + dr;
        let nc = col as isize + dc;

        if !flow_dir.in_grid(nr, nc) {
            continue;
        }

        let (nr, nc) = (nr as usize, nc as usize);
        let ndir = unsafe { flow_dir.get_unchecked(nr, nc) };

        // No-data halts propagation; the neighbor keeps its sentinel.
        if flow_dir.is_nodata(ndir) {
            continue;
        }

        area[(nr, nc)] += area[(row, col)];

        let dep = &mut dependency[nr * cols + nc];
        *dep -= 1;
        if *dep == 0 {
            queue.push_back((nr, nc));
        }
    }

    // Any data cell still waiting on a contributor sits inside a cycle.
    let mut cycle_cells = 0_usize;
    for row in 0..rows {
        for col in 0..cols {
            let dir = unsafe { flow_dir.get_unchecked(row, col) };
            if !flow_dir.is_nodata(dir) && dependency[row * cols + col] > 0 {
                cycle_cells += 1;
            }
        }
    }
    if cycle_cells > 0 {
        log::info!("flow directions contain at least one cycle ({cycle_cells} cells affected)");
    }

    let mut output = flow_dir.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(AREA_NODATA));
    *output.data_mut() = area;

    Ok(FlowAccumResult {
        area: output,
        cycle_cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::d8::NO_FLOW;

    fn dir_raster(dirs: Vec<u8>, rows: usize, cols: usize) -> Raster<u8> {
        Raster::from_vec(dirs, rows, cols).unwrap()
    }

    #[test]
    fn test_single_chain() {
        // 1x5 strip, every cell flows east into the next, last cell terminal
        let fdir = dir_raster(vec![1, 1, 1, 1, NO_FLOW], 1, 5);

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.cycle_cells, 0);

        for (col, expected) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
            assert_eq!(result.area.get(0, col).unwrap(), *expected);
        }
    }

    #[test]
    fn test_fork_to_center() {
        // Four corners drain diagonally into a terminal center; the other
        // cells are terminal and only count themselves.
        let fdir = dir_raster(
            vec![
                8, NO_FLOW, 6, //
                NO_FLOW, NO_FLOW, NO_FLOW, //
                2, NO_FLOW, 4,
            ],
            3,
            3,
        );

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.cycle_cells, 0);
        assert_eq!(result.area.get(1, 1).unwrap(), 5.0);
        for (row, col) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
            assert_eq!(result.area.get(row, col).unwrap(), 1.0);
        }
        for (row, col) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
            assert_eq!(result.area.get(row, col).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_two_cell_cycle() {
        // A flows east into B, B flows west into A: neither can drain
        let fdir = dir_raster(vec![1, 5], 1, 2);

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.cycle_cells, 2);
    }

    #[test]
    fn test_cycle_does_not_poison_rest_of_grid() {
        // Chain of three feeding a 2-cycle: the chain still drains
        //   (0,0) → (0,1) → (0,2) → (0,3) ⇄ (0,4)
        let fdir = dir_raster(vec![1, 1, 1, 1, 5], 1, 5);

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.cycle_cells, 2);
        assert_eq!(result.area.get(0, 0).unwrap(), 1.0);
        assert_eq!(result.area.get(0, 1).unwrap(), 2.0);
        assert_eq!(result.area.get(0, 2).unwrap(), 3.0);
    }

    #[test]
    fn test_nodata_hole() {
        // 5x5, everything flows east; a no-data hole in the middle swallows
        // the flow that reaches it without crashing or counting as a cycle.
        let mut dirs = vec![1_u8; 25];
        dirs[2 * 5 + 2] = 255; // hole at (2,2)
        let mut fdir = dir_raster(dirs, 5, 5);
        fdir.set_nodata(Some(255));

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.cycle_cells, 0);

        // Hole maps to the area sentinel
        assert_eq!(result.area.get(2, 2).unwrap(), -1.0);
        assert!(result.area.is_nodata_at(2, 2).unwrap());

        // Upstream of the hole accumulates normally
        assert_eq!(result.area.get(2, 0).unwrap(), 1.0);
        assert_eq!(result.area.get(2, 1).unwrap(), 2.0);

        // Downstream of the hole restarts from its own contribution
        assert_eq!(result.area.get(2, 3).unwrap(), 1.0);
        assert_eq!(result.area.get(2, 4).unwrap(), 2.0);

        // Unaffected rows accumulate 1..=5
        for col in 0..5 {
            assert_eq!(result.area.get(0, col).unwrap(), (col + 1) as f64);
        }
    }

    #[test]
    fn test_mass_conservation() {
        // 4x4, every cell flows east; each row's last cell flows off-grid.
        // The off-grid-flowing cells are the sinks: their areas must sum to
        // the total number of data cells.
        let fdir = dir_raster(vec![1_u8; 16], 4, 4);

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.cycle_cells, 0);

        let mut sink_sum = 0.0;
        for row in 0..4 {
            sink_sum += result.area.get(row, 3).unwrap();
        }
        assert_eq!(sink_sum, 16.0);
    }

    #[test]
    fn test_area_adopts_direction_geotransform() {
        use relief_core::GeoTransform;

        let mut fdir = dir_raster(vec![NO_FLOW; 4], 2, 2);
        fdir.set_transform(GeoTransform::new(0.0, 2.0, 30.0, -30.0));

        let result = flow_accumulation(&fdir).unwrap();
        assert_eq!(result.area.cell_length_x(), 30.0);
        assert_eq!(result.area.nodata(), Some(-1.0));
    }
}
