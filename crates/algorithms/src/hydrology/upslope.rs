//! Upslope tracing across a line of cells
//!
//! Rasterizes a line segment between two cells, then walks the D8 flow
//! graph backwards from it, marking every cell whose flow eventually
//! crosses the line.

use ndarray::Array2;
use std::collections::VecDeque;

use crate::hydrology::d8::{inverse, D8_OFFSETS, NO_FLOW};
use relief_core::raster::Raster;
use relief_core::{Algorithm, Error, Result};

/// Mark for a cell on the initializing line.
const LINE: u8 = 2;
/// Mark for a cell whose flow reaches the line.
const UPSLOPE: u8 = 1;
/// Everything else.
const UNMARKED: u8 = 0;

/// Parameters for upslope tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct UpslopeParams {
    /// One end of the line, as (row, col)
    pub start: (usize, usize),
    /// The other end of the line, as (row, col)
    pub end: (usize, usize),
}

/// Upslope tracing algorithm
#[derive(Debug, Clone, Default)]
pub struct UpslopeCells;

impl Algorithm for UpslopeCells {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = UpslopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Upslope Cells (D8)"
    }

    fn description(&self) -> &'static str {
        "Mark every cell whose D8 flow ultimately crosses a line of cells"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        upslope_cells(&input, params.start, params.end)
    }
}

/// Mark the cells whose flow ultimately crosses the segment start-end.
///
/// The output raster holds `2` on the rasterized line itself, `1` on every
/// cell that drains across it, and `0` (the no-data value) elsewhere.
///
/// The segment is rasterized with a Bresenham-style march along the column
/// axis. At each error step the cell one column ahead on the old row is
/// also marked, so the line stays connected under 8-neighborhood flow.
/// A segment with both endpoints in the same column degenerates to a
/// single-column march.
///
/// # Arguments
/// * `flow_dir` - D8 flow direction raster
/// * `start`, `end` - Line endpoints as (row, col); must be in-grid
///
/// # Errors
/// Returns an error without producing output if either endpoint lies
/// outside the raster.
pub fn upslope_cells(
    flow_dir: &Raster<u8>,
    start: (usize, usize),
    end: (usize, usize),
) -> Result<Raster<u8>> {
    let (rows, cols) = flow_dir.shape();

    for (row, col) in [start, end] {
        if !flow_dir.in_grid(row as isize, col as isize) {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            });
        }
    }

    let mut marks = Array2::<u8>::from_elem((rows, cols), UNMARKED);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    // March in the direction of increasing column
    let ((r0, c0), (r1, c1)) = if start.1 > end.1 {
        (end, start)
    } else {
        (start, end)
    };

    if c0 == c1 {
        // Degenerate segment: a single-column march
        let (lo, hi) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
        for row in lo..=hi {
            marks[(row, c0)] = LINE;
            queue.push_back((row, c0));
        }
    } else {
        let delta_r = r1 as isize - r0 as isize;
        let step = delta_r.unsigned_abs() as f64 / (c1 - c0) as f64;
        let mut err = 0.0_f64;
        let mut row = r0 as isize;

        for col in c0..=c1 {
            marks[(row as usize, col)] = LINE;
            queue.push_back((row as usize, col));

            err += step;
            if err >= 0.5 {
                // Mark the next column on the old row too, keeping the
                // line watertight for diagonal flow.
                if flow_dir.in_grid(row, col as isize + 1) {
                    marks[(row as usize, col + 1)] = LINE;
                    queue.push_back((row as usize, col + 1));
                }
                row += delta_r.signum();
                err -= 1.0;
            }
        }
    }

    // Breadth-first walk against the flow: a neighbor joins iff its own
    // direction points back at the cell it was reached from.
    while let Some((row, col)) = queue.pop_front() {
        for (idx, &(dr, dc)) in D8_OFFSETS.iter().enumerate() {
            let nr = row as isize + dr;
            let nc = col as isize + dc;

            if !flow_dir.in_grid(nr, nc) {
                continue;
            }

            let (nr, nc) = (nr as usize, nc as usize);
            if marks[(nr, nc)] != UNMARKED {
                continue;
            }

            let ndir = unsafe { flow_dir.get_unchecked(nr, nc) };
            if ndir == NO_FLOW || ndir > 8 || flow_dir.is_nodata(ndir) {
                continue;
            }

            if inverse(ndir) == (idx + 1) as u8 {
                marks[(nr, nc)] = UPSLOPE;
                queue.push_back((nr, nc));
            }
        }
    }

    let mut output = flow_dir.with_same_meta::<u8>(rows, cols);
    output.set_nodata(Some(UNMARKED));
    *output.data_mut() = marks;

    Ok(output)
}
