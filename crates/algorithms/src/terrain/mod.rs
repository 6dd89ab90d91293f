//! Terrain analysis algorithms
//!
//! Differential attributes of Digital Elevation Models (DEMs):
//! - Slope: rate of change of elevation (Horn 1981)
//! - Aspect: compass direction of steepest descent (Horn 1981)
//! - Curvature: total, planform and profile (Zevenbergen & Thorne 1987)
//! - SPI / CTI: stream power and compound topographic indices
//!
//! All attributes share the 3×3 sampling policy of [`derivatives`]:
//! off-grid and no-data neighbors are replaced by the center value.

mod aspect;
mod curvature;
pub(crate) mod derivatives;
mod slope;
mod spi_cti;

pub use aspect::{aspect, Aspect, AspectParams};
pub use curvature::{curvature, Curvature, CurvatureParams, CurvatureType};
pub use slope::{slope, Slope, SlopeParams, SlopeUnits};
pub use spi_cti::{cti, spi};
