use nalgebra::Point3;

/// One particle's contribution to a frame: its scalar order parameter and the
/// reference position the value is attached to.
///
/// Samples are ephemeral; they are pulled from the upstream value store each
/// frame and consumed immediately by the mapping and spreading pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSample {
    pub value: f64,
    pub position: Point3<f64>,
}

impl ParticleSample {
    pub fn new(value: f64, position: Point3<f64>) -> Self {
        Self { value, position }
    }
}
