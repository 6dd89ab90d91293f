//! Hydrological analysis algorithms
//!
//! Algorithms operating on D8 flow-direction rasters:
//! - Flow direction: D8 steepest-descent direction from a DEM
//! - Flow accumulation: upslope contributing area, with cycle reporting
//! - Upslope cells: cells draining across a rasterized line
//!
//! The direction encoding and offset/inverse tables live in [`d8`] and are
//! part of the public surface; caller-built direction rasters must use the
//! same numbering.

pub mod d8;

mod flow_accumulation;
mod flow_direction;
mod upslope;

pub use flow_accumulation::{flow_accumulation, FlowAccumResult, FlowAccumulation};
pub use flow_direction::{flow_direction, FlowDirection};
pub use upslope::{upslope_cells, UpslopeCells, UpslopeParams};
