use super::axis::GridAxis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance below which an axis extent is considered degenerate.
const EXTENT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid has not been bound to axis ranges yet")]
    Unbound,

    #[error("axis {index} has a degenerate range [{min}, {max})")]
    DegenerateAxis { index: usize, min: f64, max: f64 },

    #[error("grid is already bound; bounds can only change through a reset")]
    AlreadyBound,

    #[error("cell index {index} out of range for a grid of {len} cells")]
    CellOutOfRange { index: usize, len: usize },

    #[error("expected {expected} bin coordinates, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Selects the accumulation rule the grid represents.
///
/// The two behaviors share one store; the only difference is which
/// normalization converts raw sums into the reported field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Counting occurrences: sums are divided by the number of frames seen.
    Density,
    /// Averaging an external property: sums are divided by the total kernel
    /// weight deposited at each cell.
    #[default]
    Average,
}

/// Row-major linearization of a multi-dimensional bin coordinate.
pub fn linear_index(axes: &[GridAxis], coords: &[usize]) -> usize {
    let mut index = 0;
    for (axis, &c) in axes.iter().zip(coords) {
        index = index * axis.nbins + c;
    }
    index
}

/// The dense N-dimensional accumulation array and its normalization counters.
///
/// Once bound, the axis layout is immutable until an explicit reset; the
/// reset-pending handshake ([`GridStore::request_reset`] /
/// [`GridStore::was_reset`]) is how both the upstream "store was cleared"
/// signal and the memoryless block policy trigger a lazy rebind.
#[derive(Debug, Clone)]
pub struct GridStore {
    axes: Vec<GridAxis>,
    values: Vec<f64>,
    weights: Vec<f64>,
    norm: f64,
    bound: bool,
    reset_pending: bool,
    mode: FieldMode,
    unnormalized: bool,
}

impl GridStore {
    /// A new, unbound store. The first bind is triggered lazily through the
    /// initially pending reset.
    pub fn new(mode: FieldMode, unnormalized: bool) -> Self {
        Self {
            axes: Vec::new(),
            values: Vec::new(),
            weights: Vec::new(),
            norm: 0.0,
            bound: false,
            reset_pending: true,
            mode,
            unnormalized,
        }
    }

    /// Fixes the bin layout and zeroes all accumulation state.
    ///
    /// Only legal on an unbound store or after a reset was requested. Every
    /// axis must span a non-degenerate range; a zero-extent axis (e.g. from a
    /// collapsed box dimension) has no well-defined bins.
    pub fn bind(&mut self, axes: Vec<GridAxis>) -> Result<(), GridError> {
        if self.bound && !self.reset_pending {
            return Err(GridError::AlreadyBound);
        }
        for (index, axis) in axes.iter().enumerate() {
            if axis.extent() <= EXTENT_TOLERANCE {
                return Err(GridError::DegenerateAxis {
                    index,
                    min: axis.min,
                    max: axis.max,
                });
            }
        }
        let len = axes.iter().map(|a| a.nbins).product();
        self.axes = axes;
        self.values = vec![0.0; len];
        self.weights = vec![0.0; len];
        self.norm = 0.0;
        self.bound = true;
        self.reset_pending = false;
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Whether a reset is pending, i.e. the next frame must rebind the bounds.
    pub fn was_reset(&self) -> bool {
        self.reset_pending
    }

    /// Marks the store for rebinding without touching the accumulated data;
    /// the data is wiped when the rebind happens.
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Zeroes all cells and the normalization, and marks the bounds for
    /// recomputation on the next frame.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
        self.weights.iter_mut().for_each(|w| *w = 0.0);
        self.norm = 0.0;
        self.reset_pending = true;
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn is_unnormalized(&self) -> bool {
        self.unnormalized
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn add_norm(&mut self, delta: f64) {
        self.norm += delta;
    }

    /// Adds one kernel contribution to a cell: the value-weighted sum and,
    /// separately, the deposited weight used for read-time normalization.
    ///
    /// Addition is commutative, so contributions from the particles of one
    /// frame may be merged in any order.
    pub fn accumulate(
        &mut self,
        cell: usize,
        weighted_value: f64,
        weight: f64,
    ) -> Result<(), GridError> {
        if !self.bound {
            return Err(GridError::Unbound);
        }
        if cell >= self.values.len() {
            return Err(GridError::CellOutOfRange {
                index: cell,
                len: self.values.len(),
            });
        }
        self.values[cell] += weighted_value;
        self.weights[cell] += weight;
        Ok(())
    }

    /// Linear index of a multi-dimensional bin coordinate.
    pub fn index_of(&self, coords: &[usize]) -> Result<usize, GridError> {
        if coords.len() != self.axes.len() {
            return Err(GridError::DimensionMismatch {
                expected: self.axes.len(),
                found: coords.len(),
            });
        }
        Ok(linear_index(&self.axes, coords))
    }

    /// Multi-dimensional bin coordinate of a linear cell index.
    pub fn coords_of(&self, cell: usize) -> Vec<usize> {
        let mut coords = vec![0; self.axes.len()];
        let mut rest = cell;
        for (i, axis) in self.axes.iter().enumerate().rev() {
            coords[i] = rest % axis.nbins;
            rest /= axis.nbins;
        }
        coords
    }

    /// Spatial coordinates of a cell's center, one per axis.
    pub fn cell_center(&self, cell: usize) -> Vec<f64> {
        self.coords_of(cell)
            .iter()
            .zip(&self.axes)
            .map(|(&c, axis)| axis.center(c))
            .collect()
    }

    /// The raw accumulated value-weighted sum for a cell.
    pub fn raw(&self, cell: usize) -> Result<f64, GridError> {
        self.values
            .get(cell)
            .copied()
            .ok_or(GridError::CellOutOfRange {
                index: cell,
                len: self.values.len(),
            })
    }

    /// Total kernel weight deposited at a cell.
    pub fn deposited_weight(&self, cell: usize) -> Result<f64, GridError> {
        self.weights
            .get(cell)
            .copied()
            .ok_or(GridError::CellOutOfRange {
                index: cell,
                len: self.weights.len(),
            })
    }

    /// The field value reported for a cell.
    ///
    /// Average mode divides by the deposited weight, density mode by the frame
    /// count; the unnormalized flag suppresses both. A zero normalization is a
    /// defined degenerate case that falls back to the raw sum rather than
    /// dividing by zero. Reads have no side effects.
    pub fn read(&self, cell: usize) -> Result<f64, GridError> {
        let raw = self.raw(cell)?;
        if self.unnormalized {
            return Ok(raw);
        }
        let norm = match self.mode {
            FieldMode::Average => self.weights[cell],
            FieldMode::Density => self.norm,
        };
        if norm.abs() > 0.0 {
            Ok(raw / norm)
        } else {
            Ok(raw)
        }
    }
}
