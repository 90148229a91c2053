use crate::error::Result;
use phasegrid::core::grid::GridStore;
use phasegrid::core::models::cell::Axis;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the accumulated field as a plain-text table: one row per cell with
/// the bin-center coordinates followed by the reported field value.
///
/// Only the read interface of the grid is used here; the accumulation logic
/// never learns about output formats.
pub fn write_grid(path: &Path, grid: &GridStore, axes: &[Axis]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# phasegrid field")?;
    for (axis, layout) in axes.iter().zip(grid.axes()) {
        writeln!(
            file,
            "# axis {}: min={:.6} max={:.6} nbins={} periodic={}",
            axis.label(),
            layout.min,
            layout.max,
            layout.nbins,
            layout.periodic
        )?;
    }
    writeln!(file, "# norm={:.6}", grid.norm())?;

    for cell in 0..grid.len() {
        for center in grid.cell_center(cell) {
            write!(file, "{:14.6} ", center)?;
        }
        // Reads are side-effect free; zero deposited weight falls back to the
        // raw sum inside the store.
        let value = grid.read(cell).unwrap_or(0.0);
        writeln!(file, "{:14.6}", value)?;
    }

    info!("Wrote {} grid cells to '{}'", grid.len(), path.display());
    Ok(())
}
