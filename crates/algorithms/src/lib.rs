//! # Relief Algorithms
//!
//! Terrain and hydrological analysis over digital elevation models.
//!
//! ## Available Algorithm Categories
//!
//! - **hydrology**: D8 flow direction, dependency-driven flow accumulation
//!   with cycle reporting, upslope tracing across a line of cells
//! - **terrain**: Slope (Horn 1981), aspect, curvature (Zevenbergen &
//!   Thorne 1987), SPI and CTI composite indices

pub mod hydrology;
pub mod terrain;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        flow_accumulation, flow_direction, upslope_cells, FlowAccumResult, FlowAccumulation,
        FlowDirection, UpslopeCells, UpslopeParams,
    };
    pub use crate::terrain::{
        aspect, curvature, cti, slope, spi, Aspect, AspectParams, Curvature, CurvatureParams,
        CurvatureType, Slope, SlopeParams, SlopeUnits,
    };
    pub use relief_core::prelude::*;
}
