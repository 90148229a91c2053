use crate::core::grid::GridAxis;
use crate::core::grid::store::linear_index;
use crate::core::kernels::KernelFunction;
use itertools::Itertools;
use std::sync::Arc;

/// Spreads a mapped point onto the grid cells within the kernel support.
///
/// This is a thin adapter over the kernel-evaluation capability: it only
/// enumerates the stencil of candidate cells per axis (wrapping periodic axes
/// across the seam, clamping non-periodic ones) and asks the kernel for the
/// weight at each cell center. Weights are un-normalized.
#[derive(Debug, Clone)]
pub struct KernelSpreader {
    kernel: Arc<dyn KernelFunction>,
    bandwidth: Vec<f64>,
}

impl KernelSpreader {
    pub fn new(kernel: Arc<dyn KernelFunction>, bandwidth: Vec<f64>) -> Self {
        Self { kernel, bandwidth }
    }

    /// All `(linear cell index, weight)` contributions of one mapped point.
    ///
    /// `point` has one coordinate per grid axis, in axis order. A point near a
    /// periodic boundary deposits weight on both edges of the seam; the total
    /// deposited weight matches the non-wrapping case.
    pub fn spread(&self, point: &[f64], axes: &[GridAxis]) -> Vec<(usize, f64)> {
        let mut per_axis: Vec<Vec<(usize, f64)>> = Vec::with_capacity(axes.len());
        for (i, axis) in axes.iter().enumerate() {
            let sigma = self.bandwidth[i];
            let cutoff = self.kernel.cutoff(sigma);
            let width = axis.width();
            let x = point[i];
            let lo = ((x - cutoff - axis.min) / width).floor() as isize;
            let hi = ((x + cutoff - axis.min) / width).floor() as isize;

            let mut candidates = Vec::new();
            if axis.periodic && (hi - lo + 1) >= axis.nbins as isize {
                // Support spans the whole axis: visit each bin exactly once.
                for b in 0..axis.nbins {
                    let d = axis.displacement(x, axis.center(b));
                    candidates.push((b, (d / sigma).powi(2)));
                }
            } else {
                for raw in lo..=hi {
                    if let Some(b) = axis.fold(raw) {
                        let d = axis.displacement(x, axis.center(b));
                        candidates.push((b, (d / sigma).powi(2)));
                    }
                }
            }
            per_axis.push(candidates);
        }

        per_axis
            .into_iter()
            .map(|candidates| candidates.into_iter())
            .multi_cartesian_product()
            .filter_map(|combo| {
                let coords: Vec<usize> = combo.iter().map(|&(b, _)| b).collect();
                let scaled_r2: f64 = combo.iter().map(|&(_, d2)| d2).sum();
                let weight = self.kernel.evaluate(scaled_r2);
                (weight > 0.0).then(|| (linear_index(axes, &coords), weight))
            })
            .collect()
    }
}
