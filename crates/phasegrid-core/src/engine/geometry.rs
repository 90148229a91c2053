use super::config::AccumulatorConfig;
use crate::core::models::cell::{Axis, SimulationCell};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum GeometryError {
    #[error(
        "cell is not orthorhombic; periodic wraparound and fractional coordinates are only defined for rectangular boxes"
    )]
    NonOrthorhombicCell,
}

/// Maps a particle position into 1-3 grid coordinates relative to a moving
/// origin.
///
/// The displacement is always the minimum-image displacement from the origin;
/// in fractional mode it is additionally scaled by the box extents so each
/// component lands in `[-0.5, 0.5)`. Only the configured axes are emitted, in
/// the configured order.
#[derive(Debug, Clone)]
pub struct GeometryMapper {
    axes: Vec<Axis>,
    fractional: bool,
}

impl GeometryMapper {
    pub fn new(config: &AccumulatorConfig) -> Self {
        Self {
            axes: config.axes.clone(),
            fractional: config.fractional,
        }
    }

    pub fn map(
        &self,
        origin: &Point3<f64>,
        position: &Point3<f64>,
        cell: &SimulationCell,
    ) -> Result<Vec<f64>, GeometryError> {
        if !cell.is_orthorhombic() {
            return Err(GeometryError::NonOrthorhombicCell);
        }
        let displacement = cell.minimum_image(origin, position);
        let displacement = if self.fractional {
            cell.to_fractional(&displacement)
        } else {
            displacement
        };
        Ok(self
            .axes
            .iter()
            .map(|axis| displacement[axis.index()])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::cell::Axis;
    use nalgebra::{Matrix3, Vector3};

    const TOLERANCE: f64 = 1e-12;

    fn mapper(selection: &[Axis], fractional: bool) -> GeometryMapper {
        let config = AccumulatorConfig::builder()
            .axes(selection.to_vec())
            .nbins(vec![10; selection.len()])
            .bandwidth(vec![0.1; selection.len()])
            .fractional(fractional)
            .build()
            .unwrap();
        GeometryMapper::new(&config)
    }

    #[test]
    fn map_emits_only_the_configured_axes_in_order() {
        let cell = SimulationCell::orthorhombic([10.0, 10.0, 10.0]);
        let origin = Point3::new(0.0, 0.0, 0.0);
        let position = Point3::new(1.0, 2.0, 3.0);
        let mapped = mapper(&[Axis::Z, Axis::X], false)
            .map(&origin, &position, &cell)
            .unwrap();
        assert_eq!(mapped.len(), 2);
        assert!((mapped[0] - 3.0).abs() < TOLERANCE);
        assert!((mapped[1] - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn map_applies_the_minimum_image_convention() {
        let cell = SimulationCell::orthorhombic([10.0, 10.0, 10.0]);
        let origin = Point3::new(0.5, 0.0, 0.0);
        let position = Point3::new(9.5, 0.0, 0.0);
        let mapped = mapper(&[Axis::X], false)
            .map(&origin, &position, &cell)
            .unwrap();
        assert!((mapped[0] - (-1.0)).abs() < TOLERANCE);
    }

    #[test]
    fn fractional_map_scales_into_the_half_open_unit_interval() {
        let cell = SimulationCell::orthorhombic([10.0, 20.0, 40.0]);
        let origin = Point3::new(0.0, 0.0, 0.0);
        let position = Point3::new(2.5, 5.0, 10.0);
        let mapped = mapper(&[Axis::X, Axis::Y, Axis::Z], true)
            .map(&origin, &position, &cell)
            .unwrap();
        assert!((mapped[0] - 0.25).abs() < TOLERANCE);
        assert!((mapped[1] - 0.25).abs() < TOLERANCE);
        assert!((mapped[2] - 0.25).abs() < TOLERANCE);
    }

    #[test]
    fn non_orthorhombic_cell_is_rejected() {
        let mut matrix = Matrix3::from_diagonal(&Vector3::new(10.0, 10.0, 10.0));
        matrix[(1, 0)] = 3.0;
        let cell = SimulationCell::from_matrix(matrix);
        let result = mapper(&[Axis::X], true).map(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
            &cell,
        );
        assert_eq!(result, Err(GeometryError::NonOrthorhombicCell));
    }
}
