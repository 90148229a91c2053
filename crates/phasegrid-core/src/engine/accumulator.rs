use super::config::{AccumulatorConfig, ConfigError, MemoryPolicy, RANGE_TOLERANCE};
use super::error::EngineError;
use super::geometry::{GeometryError, GeometryMapper};
use super::source::SampleSource;
use super::spread::KernelSpreader;
use crate::core::grid::{FieldMode, GridAxis, GridStore};
use crate::core::kernels::KernelRegistry;
use crate::core::models::cell::SimulationCell;
use crate::core::models::sample::ParticleSample;
use nalgebra::Point3;
use tracing::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-frame inputs re-read from the simulation on every accumulation cycle.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub step: u64,
    /// Position of the designated reference particle for this frame.
    pub origin: Point3<f64>,
    pub cell: SimulationCell,
}

impl FrameContext {
    pub fn new(step: u64, origin: Point3<f64>, cell: SimulationCell) -> Self {
        Self { step, origin, cell }
    }
}

/// Orchestrates one full accumulation cycle per scheduled simulation step.
///
/// The grid starts unbound; bounds are derived lazily from the first processed
/// frame's box (or the confinement ranges) and re-derived whenever the upstream
/// store signals it was cleared or a memoryless block boundary passes. Once
/// bound, the layout is immutable and the box extent is checked against it on
/// every subsequent frame.
#[derive(Debug)]
pub struct AccumulationController {
    config: AccumulatorConfig,
    mapper: GeometryMapper,
    spreader: KernelSpreader,
    grid: GridStore,
}

impl AccumulationController {
    pub fn new(
        config: AccumulatorConfig,
        registry: &KernelRegistry,
    ) -> Result<Self, EngineError> {
        let kernel = registry
            .get(&config.kernel)
            .ok_or_else(|| ConfigError::UnknownKernel(config.kernel.clone()))?;
        let mapper = GeometryMapper::new(&config);
        let spreader = KernelSpreader::new(kernel, config.bandwidth.clone());
        let grid = GridStore::new(config.mode, config.unnormalized);
        info!(
            "Accumulation controller ready: {} axes, kernel '{}', stride {}",
            config.axes.len(),
            config.kernel,
            config.stride
        );
        Ok(Self {
            config,
            mapper,
            spreader,
            grid,
        })
    }

    /// Read access to the accumulated grid for downstream formatters.
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// Marks the end of a reporting window.
    ///
    /// Under the memoryless policy this wipes the grid history so the next
    /// window starts from scratch; under the cumulative policy it is a no-op.
    pub fn finish_block(&mut self) {
        if self.config.memory == MemoryPolicy::Memoryless {
            debug!("Block boundary: wiping grid history");
            self.grid.reset();
        }
    }

    /// Runs one accumulation cycle for the given frame.
    ///
    /// Geometric failures (non-orthorhombic cell, box drift after binding) are
    /// fatal for the run; the accumulated statistics would no longer be well
    /// defined, so nothing is retried or skipped silently.
    pub fn process_frame<S: SampleSource>(
        &mut self,
        frame: &FrameContext,
        source: &mut S,
    ) -> Result<(), EngineError> {
        if frame.step % self.config.stride != 0 {
            trace!("Step {} off stride; skipping", frame.step);
            return Ok(());
        }
        // In windowed runs the initial step carries no data yet.
        if !self.config.single_run && frame.step == 0 {
            debug!("Windowed run: skipping initial step");
            return Ok(());
        }

        if !frame.cell.is_orthorhombic() {
            return Err(GeometryError::NonOrthorhombicCell.into());
        }

        if source.take_reset() {
            debug!("Upstream store was cleared; grid will be rebound");
            self.grid.request_reset();
        }

        if self.grid.was_reset() || !self.grid.is_bound() {
            let axes = self.derive_axes(&frame.cell);
            info!(
                "Binding grid at step {}: {}",
                frame.step,
                describe_axes(&axes)
            );
            self.grid.bind(axes)?;
        } else {
            self.verify_extents(&frame.cell)?;
        }

        // Density fields count frames, not particles; the norm advances by
        // exactly one per processed frame.
        if self.config.mode == FieldMode::Density {
            self.grid.add_norm(1.0);
        }

        let indices = source.active();
        let mut samples = Vec::with_capacity(indices.len());
        for index in indices {
            samples.push(
                source
                    .sample(index)
                    .ok_or(EngineError::MissingSample { index })?,
            );
        }
        debug!(
            "Processing step {}: {} active samples",
            frame.step,
            samples.len()
        );

        let axes: Vec<GridAxis> = self.grid.axes().to_vec();
        let mapper = &self.mapper;
        let spreader = &self.spreader;
        let origin = frame.origin;
        let cell = frame.cell;

        let compute = |sample: &ParticleSample| -> Result<Vec<(usize, f64, f64)>, GeometryError> {
            let point = mapper.map(&origin, &sample.position, &cell)?;
            Ok(spreader
                .spread(&point, &axes)
                .into_iter()
                .map(|(index, weight)| (index, weight * sample.value, weight))
                .collect())
        };

        #[cfg(not(feature = "parallel"))]
        let results: Result<Vec<_>, _> = samples.iter().map(compute).collect();

        #[cfg(feature = "parallel")]
        let results: Result<Vec<_>, _> = samples.par_iter().map(compute).collect();

        // Contributions commute, so the merge order is irrelevant.
        let mut deposited = 0usize;
        for batch in results? {
            deposited += batch.len();
            for (index, weighted_value, weight) in batch {
                self.grid.accumulate(index, weighted_value, weight)?;
            }
        }
        trace!(
            "Step {}: merged {} cell contributions",
            frame.step, deposited
        );
        Ok(())
    }

    /// Grid bounds for the current frame: literal confinement ranges for
    /// confined axes, `[-0.5, 0.5)` of the box extent (or of the fractional
    /// cell) for the rest.
    fn derive_axes(&self, cell: &SimulationCell) -> Vec<GridAxis> {
        self.config
            .axes
            .iter()
            .enumerate()
            .map(|(i, &axis)| {
                if let Some(range) = self.config.confinement[i] {
                    let extent = range.upper - range.lower;
                    let nbins = self.config.resolved_bins(i, extent);
                    GridAxis::new(range.lower, range.upper, nbins, false)
                } else if self.config.fractional {
                    GridAxis::new(-0.5, 0.5, self.config.resolved_bins(i, 1.0), true)
                } else {
                    let extent = cell.extent(axis);
                    GridAxis::new(
                        -0.5 * extent,
                        0.5 * extent,
                        self.config.resolved_bins(i, extent),
                        true,
                    )
                }
            })
            .collect()
    }

    /// After binding, the box must stay fixed along every non-confined,
    /// non-fractional axis; drift invalidates the accumulated statistics.
    fn verify_extents(&self, cell: &SimulationCell) -> Result<(), EngineError> {
        if self.config.fractional {
            return Ok(());
        }
        for (i, &axis) in self.config.axes.iter().enumerate() {
            if self.config.confinement[i].is_some() {
                continue;
            }
            let expected = self.grid.axes()[i].extent();
            let observed = cell.extent(axis);
            if (expected - observed).abs() > RANGE_TOLERANCE {
                return Err(EngineError::VolatileBox {
                    axis: axis.label(),
                    expected,
                    observed,
                });
            }
        }
        Ok(())
    }
}

fn describe_axes(axes: &[GridAxis]) -> String {
    axes.iter()
        .map(|a| {
            format!(
                "[{:.4}, {:.4}) x{}{}",
                a.min,
                a.max,
                a.nbins,
                if a.periodic { " (periodic)" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
