//! Example: Basic terrain analysis workflow
//!
//! This example demonstrates a full analysis pass over a synthetic DEM:
//! 1. Create a DEM (in real use, load from file)
//! 2. Derive D8 flow directions and flow accumulation
//! 3. Calculate slope, aspect and the SPI/CTI indices

use relief_algorithms::hydrology::{flow_accumulation, flow_direction, upslope_cells};
use relief_algorithms::terrain::{aspect, cti, slope, spi, AspectParams, SlopeParams, SlopeUnits};
use relief_core::{GeoTransform, Raster};

fn main() {
    // Create a synthetic DEM (in real use, load from file)
    let dem = create_synthetic_dem(100, 100);

    println!("DEM created: {} x {}", dem.cols(), dem.rows());
    println!("Cell size: {}", dem.cell_size());

    // Flow directions and accumulation
    let fdir = flow_direction(&dem).unwrap();
    let accum = flow_accumulation(&fdir).unwrap();
    println!(
        "\nFlow accumulation:\n  Max basin: {:.0} cells\n  Cycle cells: {}",
        accum.area.statistics().max.unwrap_or(0.0),
        accum.cycle_cells
    );

    // Slope in percent, feeding the composite indices
    let pct_slope = slope(
        &dem,
        SlopeParams {
            units: SlopeUnits::Percent,
            z_scale: 1.0,
        },
    )
    .unwrap();
    let slope_stats = pct_slope.statistics();
    println!(
        "\nSlope (percent):\n  Min: {:.2}\n  Max: {:.2}\n  Mean: {:.2}",
        slope_stats.min.unwrap_or(0.0),
        slope_stats.max.unwrap_or(0.0),
        slope_stats.mean.unwrap_or(0.0)
    );

    // Aspect
    let aspect_result = aspect(&dem, AspectParams::default()).unwrap();
    let aspect_stats = aspect_result.statistics();
    println!(
        "\nAspect (degrees):\n  Min: {:.2}\n  Max: {:.2}",
        aspect_stats.min.unwrap_or(0.0),
        aspect_stats.max.unwrap_or(0.0),
    );

    // Composite indices
    let spi_raster = spi(&accum.area, &pct_slope).unwrap();
    let cti_raster = cti(&accum.area, &pct_slope).unwrap();
    println!(
        "\nSPI mean: {:.3}\nCTI mean: {:.3}",
        spi_raster.statistics().mean.unwrap_or(0.0),
        cti_raster.statistics().mean.unwrap_or(0.0)
    );

    // Which cells drain across the middle column?
    let traced = upslope_cells(&fdir, (0, 50), (99, 50)).unwrap();
    let caught = traced.num_data_cells();
    println!("\nCells draining across column 50: {caught}");

    println!("\n✓ Terrain analysis complete!");
}

/// Create a synthetic DEM with interesting terrain features
fn create_synthetic_dem(rows: usize, cols: usize) -> Raster<f64> {
    let mut dem = Raster::new(rows, cols);
    dem.set_transform(GeoTransform::new(0.0, rows as f64, 10.0, -10.0));

    let center_row = rows as f64 / 2.0;
    let center_col = cols as f64 / 2.0;

    for row in 0..rows {
        for col in 0..cols {
            // Conical hill in the center with ridges and valleys
            let dr = row as f64 - center_row;
            let dc = col as f64 - center_col;
            let dist = (dr * dr + dc * dc).sqrt();

            let hill = 500.0 - dist * 5.0;
            let ridge = ((row as f64 * 0.1).sin() * 20.0).max(0.0);
            let valley = ((col as f64 * 0.15).cos() * 15.0).max(0.0);

            let elevation = hill.max(100.0) + ridge + valley;
            dem.set(row, col, elevation).unwrap();
        }
    }

    dem
}
