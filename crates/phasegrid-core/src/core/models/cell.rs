use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Numerical tolerance below which a cell matrix element is treated as zero.
pub const CELL_TOLERANCE: f64 = 1e-10;

/// Identifies one of the three Cartesian axes of the simulation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'x' => Some(Axis::X),
            'y' => Some(Axis::Y),
            'z' => Some(Axis::Z),
            _ => None,
        }
    }
}

/// The periodic simulation cell, stored as a 3x3 matrix of cell vectors.
///
/// Minimum-image displacements and fractional-coordinate conversion are only
/// well defined here for orthorhombic (rectangular) cells; callers are expected
/// to check [`SimulationCell::is_orthorhombic`] before relying on either.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationCell {
    matrix: Matrix3<f64>,
}

impl SimulationCell {
    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// Builds a rectangular cell from its three edge lengths.
    pub fn orthorhombic(lengths: [f64; 3]) -> Self {
        Self {
            matrix: Matrix3::from_diagonal(&Vector3::new(lengths[0], lengths[1], lengths[2])),
        }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// The cell extent along one Cartesian axis (the diagonal matrix element).
    pub fn extent(&self, axis: Axis) -> f64 {
        let i = axis.index();
        self.matrix[(i, i)]
    }

    pub fn is_orthorhombic(&self) -> bool {
        for i in 0..3 {
            for j in 0..3 {
                if i != j && self.matrix[(i, j)].abs() > CELL_TOLERANCE {
                    return false;
                }
            }
        }
        true
    }

    /// Minimum-image displacement `to - from` for an orthorhombic cell.
    ///
    /// Each component is folded into `[-L/2, L/2)` where `L` is the cell extent
    /// along that axis; axes with non-positive extent are left unwrapped.
    pub fn minimum_image(&self, from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
        let mut d = to - from;
        for i in 0..3 {
            let l = self.matrix[(i, i)];
            if l > 0.0 {
                d[i] -= (d[i] / l).round() * l;
            }
        }
        d
    }

    /// Converts a displacement into box-fractional components.
    ///
    /// A minimum-image displacement maps into `[-0.5, 0.5)` per axis.
    pub fn to_fractional(&self, displacement: &Vector3<f64>) -> Vector3<f64> {
        let mut f = *displacement;
        for i in 0..3 {
            let l = self.matrix[(i, i)];
            if l > 0.0 {
                f[i] /= l;
            }
        }
        f
    }
}
