use crate::core::grid::FieldMode;
use crate::core::models::cell::Axis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance below which an axis range is considered degenerate.
pub const RANGE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid axis selection '{0}': expected an ordered subset of x, y, z")]
    InvalidAxes(String),

    #[error("Either bin counts or grid spacings must be set")]
    BinSpecMissing,

    #[error("{what} must list one entry per selected axis (expected {expected}, got {found})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{what} along {axis} must be positive")]
    NonPositive {
        what: &'static str,
        axis: &'static str,
    },

    #[error("confinement along {axis} is incompatible with fractional coordinates")]
    FractionalConfinementConflict { axis: &'static str },

    #[error("confinement range [{lower}, {upper}) along {axis} makes no sense")]
    DegenerateRange {
        axis: &'static str,
        lower: f64,
        upper: f64,
    },

    #[error("unknown kernel family '{0}'")]
    UnknownKernel(String),
}

/// How accumulated sums relate to the frames already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPolicy {
    /// Sums and normalization persist for the whole run; a read at step N
    /// integrates all N frames seen so far.
    #[default]
    Cumulative,
    /// Block averaging: each read boundary wipes history, so a read sees only
    /// the current window.
    Memoryless,
}

/// A literal `[lower, upper)` sub-range replacing the box-derived bounds of
/// one axis. Confined axes are non-periodic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confinement {
    pub lower: f64,
    pub upper: f64,
}

/// Parses an ordered axis selection such as `"x"`, `"xz"`, or `"xyz"`.
pub fn parse_axis_selection(selection: &str) -> Result<Vec<Axis>, ConfigError> {
    let mut axes = Vec::with_capacity(3);
    for c in selection.chars() {
        let axis = Axis::from_char(c).ok_or_else(|| ConfigError::InvalidAxes(selection.into()))?;
        if axes.contains(&axis) {
            return Err(ConfigError::InvalidAxes(selection.into()));
        }
        axes.push(axis);
    }
    if axes.is_empty() || axes.len() > 3 {
        return Err(ConfigError::InvalidAxes(selection.into()));
    }
    Ok(axes)
}

/// Validated configuration surface of the accumulation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorConfig {
    pub axes: Vec<Axis>,
    pub nbins: Option<Vec<usize>>,
    pub spacing: Option<Vec<f64>>,
    pub bandwidth: Vec<f64>,
    pub kernel: String,
    pub fractional: bool,
    /// One entry per selected axis, in selection order.
    pub confinement: Vec<Option<Confinement>>,
    pub unnormalized: bool,
    pub memory: MemoryPolicy,
    pub mode: FieldMode,
    /// Frames between collected samples.
    pub stride: u64,
    /// When false, the engine is driven in sub-windows and the initial step
    /// carries no data yet, so it is skipped.
    pub single_run: bool,
}

impl AccumulatorConfig {
    pub fn builder() -> AccumulatorConfigBuilder {
        AccumulatorConfigBuilder::new()
    }

    /// Number of bins along the i-th selected axis for a given extent.
    ///
    /// When only a spacing is given the count is derived from the extent; when
    /// both are given the finer of the two wins.
    pub fn resolved_bins(&self, axis_index: usize, extent: f64) -> usize {
        let from_spacing = self.spacing.as_ref().map(|s| {
            let spacing = s[axis_index];
            ((extent / spacing).ceil() as usize).max(1)
        });
        let from_counts = self.nbins.as_ref().map(|n| n[axis_index]);
        match (from_counts, from_spacing) {
            (Some(n), Some(m)) => n.max(m),
            (Some(n), None) => n,
            (None, Some(m)) => m,
            // Unreachable for validated configs.
            (None, None) => 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct AccumulatorConfigBuilder {
    axes: Option<Vec<Axis>>,
    nbins: Option<Vec<usize>>,
    spacing: Option<Vec<f64>>,
    bandwidth: Option<Vec<f64>>,
    kernel: Option<String>,
    fractional: bool,
    confinement: Vec<(Axis, Confinement)>,
    unnormalized: bool,
    memory: MemoryPolicy,
    mode: FieldMode,
    stride: u64,
    single_run: bool,
}

impl AccumulatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            stride: 1,
            single_run: true,
            ..Self::default()
        }
    }

    pub fn axes(mut self, axes: Vec<Axis>) -> Self {
        self.axes = Some(axes);
        self
    }
    pub fn axis_selection(mut self, selection: &str) -> Result<Self, ConfigError> {
        self.axes = Some(parse_axis_selection(selection)?);
        Ok(self)
    }
    pub fn nbins(mut self, nbins: Vec<usize>) -> Self {
        self.nbins = Some(nbins);
        self
    }
    pub fn spacing(mut self, spacing: Vec<f64>) -> Self {
        self.spacing = Some(spacing);
        self
    }
    pub fn bandwidth(mut self, bandwidth: Vec<f64>) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }
    pub fn kernel(mut self, kernel: impl Into<String>) -> Self {
        self.kernel = Some(kernel.into());
        self
    }
    pub fn fractional(mut self, fractional: bool) -> Self {
        self.fractional = fractional;
        self
    }
    pub fn confine(mut self, axis: Axis, lower: f64, upper: f64) -> Self {
        self.confinement.push((axis, Confinement { lower, upper }));
        self
    }
    pub fn unnormalized(mut self, unnormalized: bool) -> Self {
        self.unnormalized = unnormalized;
        self
    }
    pub fn memory(mut self, memory: MemoryPolicy) -> Self {
        self.memory = memory;
        self
    }
    pub fn mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }
    pub fn stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }
    pub fn single_run(mut self, single_run: bool) -> Self {
        self.single_run = single_run;
        self
    }

    /// Validates the whole surface eagerly; a run never starts from a
    /// contradictory or incomplete setup.
    pub fn build(self) -> Result<AccumulatorConfig, ConfigError> {
        let axes = self.axes.ok_or(ConfigError::MissingParameter("axes"))?;
        if axes.is_empty() || axes.len() > 3 {
            return Err(ConfigError::InvalidAxes(
                axes.iter().map(|a| a.label()).collect(),
            ));
        }
        let ndim = axes.len();

        if self.nbins.is_none() && self.spacing.is_none() {
            return Err(ConfigError::BinSpecMissing);
        }
        if let Some(nbins) = &self.nbins {
            if nbins.len() != ndim {
                return Err(ConfigError::LengthMismatch {
                    what: "bin counts",
                    expected: ndim,
                    found: nbins.len(),
                });
            }
            for (axis, &n) in axes.iter().zip(nbins) {
                if n == 0 {
                    return Err(ConfigError::NonPositive {
                        what: "bin count",
                        axis: axis.label(),
                    });
                }
            }
        }
        if let Some(spacing) = &self.spacing {
            if spacing.len() != ndim {
                return Err(ConfigError::LengthMismatch {
                    what: "grid spacings",
                    expected: ndim,
                    found: spacing.len(),
                });
            }
            for (axis, &s) in axes.iter().zip(spacing) {
                if s <= 0.0 {
                    return Err(ConfigError::NonPositive {
                        what: "grid spacing",
                        axis: axis.label(),
                    });
                }
            }
        }

        let bandwidth = self
            .bandwidth
            .ok_or(ConfigError::MissingParameter("bandwidth"))?;
        if bandwidth.len() != ndim {
            return Err(ConfigError::LengthMismatch {
                what: "bandwidths",
                expected: ndim,
                found: bandwidth.len(),
            });
        }
        for (axis, &b) in axes.iter().zip(&bandwidth) {
            if b <= 0.0 {
                return Err(ConfigError::NonPositive {
                    what: "bandwidth",
                    axis: axis.label(),
                });
            }
        }

        let mut confinement: Vec<Option<Confinement>> = vec![None; ndim];
        for (axis, range) in self.confinement {
            let Some(slot) = axes.iter().position(|&a| a == axis) else {
                return Err(ConfigError::InvalidAxes(axis.label().into()));
            };
            if self.fractional {
                return Err(ConfigError::FractionalConfinementConflict {
                    axis: axis.label(),
                });
            }
            if (range.upper - range.lower).abs() < RANGE_TOLERANCE {
                return Err(ConfigError::DegenerateRange {
                    axis: axis.label(),
                    lower: range.lower,
                    upper: range.upper,
                });
            }
            confinement[slot] = Some(range);
        }

        Ok(AccumulatorConfig {
            axes,
            nbins: self.nbins,
            spacing: self.spacing,
            bandwidth,
            kernel: self.kernel.unwrap_or_else(|| "gaussian".into()),
            fractional: self.fractional,
            confinement,
            unnormalized: self.unnormalized,
            memory: self.memory,
            mode: self.mode,
            stride: self.stride.max(1),
            single_run: self.single_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AccumulatorConfigBuilder {
        AccumulatorConfigBuilder::new()
            .axes(vec![Axis::X])
            .nbins(vec![10])
            .bandwidth(vec![0.2])
    }

    #[test]
    fn axis_selection_accepts_all_seven_combinations() {
        for (s, expected) in [
            ("x", vec![Axis::X]),
            ("y", vec![Axis::Y]),
            ("z", vec![Axis::Z]),
            ("xy", vec![Axis::X, Axis::Y]),
            ("xz", vec![Axis::X, Axis::Z]),
            ("yz", vec![Axis::Y, Axis::Z]),
            ("xyz", vec![Axis::X, Axis::Y, Axis::Z]),
        ] {
            assert_eq!(parse_axis_selection(s).unwrap(), expected);
        }
    }

    #[test]
    fn axis_selection_rejects_empty_duplicate_and_unknown() {
        assert!(parse_axis_selection("").is_err());
        assert!(parse_axis_selection("xx").is_err());
        assert!(parse_axis_selection("xq").is_err());
    }

    #[test]
    fn build_requires_bins_or_spacing() {
        let err = AccumulatorConfigBuilder::new()
            .axes(vec![Axis::X])
            .bandwidth(vec![0.2])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::BinSpecMissing);
    }

    #[test]
    fn build_rejects_bandwidth_length_mismatch() {
        let err = AccumulatorConfigBuilder::new()
            .axes(vec![Axis::X, Axis::Y])
            .nbins(vec![10, 10])
            .bandwidth(vec![0.2])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::LengthMismatch { .. }));
    }

    #[test]
    fn build_rejects_non_positive_bandwidth() {
        let err = base().bandwidth(vec![0.0]).build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositive {
                what: "bandwidth",
                axis: "x",
            }
        );
    }

    #[test]
    fn fractional_and_confinement_are_statically_incompatible() {
        let err = base()
            .fractional(true)
            .confine(Axis::X, 0.0, 5.0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::FractionalConfinementConflict { axis: "x" }
        );
    }

    #[test]
    fn degenerate_confinement_range_is_rejected() {
        let err = base().confine(Axis::X, 2.0, 2.0).build().unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateRange { axis: "x", .. }));
    }

    #[test]
    fn confinement_on_an_unselected_axis_is_rejected() {
        let err = base().confine(Axis::Z, 0.0, 5.0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAxes(_)));
    }

    #[test]
    fn bins_resolve_from_spacing_and_the_finer_wins() {
        let spacing_only = AccumulatorConfigBuilder::new()
            .axes(vec![Axis::X])
            .spacing(vec![0.5])
            .bandwidth(vec![0.2])
            .build()
            .unwrap();
        assert_eq!(spacing_only.resolved_bins(0, 10.0), 20);

        let both = base().spacing(vec![0.1]).build().unwrap();
        assert_eq!(both.resolved_bins(0, 10.0), 100);

        let coarse_spacing = base().spacing(vec![5.0]).build().unwrap();
        assert_eq!(coarse_spacing.resolved_bins(0, 10.0), 10);
    }

    #[test]
    fn defaults_are_cumulative_average_gaussian() {
        let config = base().build().unwrap();
        assert_eq!(config.memory, MemoryPolicy::Cumulative);
        assert_eq!(config.mode, FieldMode::Average);
        assert_eq!(config.kernel, "gaussian");
        assert_eq!(config.stride, 1);
        assert!(config.single_run);
    }
}
