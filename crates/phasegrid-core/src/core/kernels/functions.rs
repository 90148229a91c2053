/// Squared scaled distance beyond which a Gaussian contribution is truncated.
///
/// exp(-6.25) is below 2e-3, so the tail discarded by the cutoff is negligible
/// against the accumulated sums.
const GAUSSIAN_DP2_CUTOFF: f64 = 6.25;

/// A smoothing-kernel family, radial in the bandwidth-scaled distance.
///
/// Implementations report a finite (or practically truncated) support radius
/// per axis through [`KernelFunction::cutoff`]; the spreader only enumerates
/// grid cells whose centers fall within that radius.
pub trait KernelFunction: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Support radius along one axis for the given bandwidth.
    fn cutoff(&self, bandwidth: f64) -> f64;

    /// Weight for the squared scaled distance `u2 = sum_i (d_i / sigma_i)^2`.
    ///
    /// Returns zero outside the support. The peak value at `u2 = 0` is one.
    fn evaluate(&self, scaled_r2: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianKernel;

impl KernelFunction for GaussianKernel {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn cutoff(&self, bandwidth: f64) -> f64 {
        (2.0 * GAUSSIAN_DP2_CUTOFF).sqrt() * bandwidth
    }

    fn evaluate(&self, scaled_r2: f64) -> f64 {
        if scaled_r2 > 2.0 * GAUSSIAN_DP2_CUTOFF {
            0.0
        } else {
            (-0.5 * scaled_r2).exp()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TriangularKernel;

impl KernelFunction for TriangularKernel {
    fn name(&self) -> &'static str {
        "triangular"
    }

    fn cutoff(&self, bandwidth: f64) -> f64 {
        bandwidth
    }

    fn evaluate(&self, scaled_r2: f64) -> f64 {
        let u = scaled_r2.sqrt();
        if u >= 1.0 { 0.0 } else { 1.0 - u }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UniformKernel;

impl KernelFunction for UniformKernel {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn cutoff(&self, bandwidth: f64) -> f64 {
        bandwidth
    }

    fn evaluate(&self, scaled_r2: f64) -> f64 {
        if scaled_r2 >= 1.0 { 0.0 } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn gaussian_peaks_at_one_for_zero_displacement() {
        let k = GaussianKernel;
        assert!((k.evaluate(0.0) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn gaussian_is_truncated_beyond_the_cutoff() {
        let k = GaussianKernel;
        let bandwidth = 0.3;
        let cutoff = k.cutoff(bandwidth);
        let scaled_r2 = (cutoff / bandwidth).powi(2);
        assert_eq!(k.evaluate(scaled_r2 * 1.01), 0.0);
        assert!(k.evaluate(scaled_r2 * 0.99) > 0.0);
    }

    #[test]
    fn gaussian_decays_monotonically() {
        let k = GaussianKernel;
        assert!(k.evaluate(0.5) > k.evaluate(1.0));
        assert!(k.evaluate(1.0) > k.evaluate(2.0));
    }

    #[test]
    fn triangular_is_linear_in_scaled_distance() {
        let k = TriangularKernel;
        assert!((k.evaluate(0.25) - 0.5).abs() < TOLERANCE);
        assert_eq!(k.evaluate(1.0), 0.0);
        assert_eq!(k.evaluate(4.0), 0.0);
    }

    #[test]
    fn uniform_is_flat_inside_its_support() {
        let k = UniformKernel;
        assert_eq!(k.evaluate(0.0), 1.0);
        assert_eq!(k.evaluate(0.99), 1.0);
        assert_eq!(k.evaluate(1.0), 0.0);
    }

    #[test]
    fn compact_kernels_have_support_equal_to_the_bandwidth() {
        assert_eq!(TriangularKernel.cutoff(0.7), 0.7);
        assert_eq!(UniformKernel.cutoff(0.7), 0.7);
    }
}
