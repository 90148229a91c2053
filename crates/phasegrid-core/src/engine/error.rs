use super::config::ConfigError;
use super::geometry::GeometryError;
use crate::core::grid::GridError;
use thiserror::Error;

/// Errors raised by the accumulation engine.
///
/// All of these are non-recoverable for the current run: accumulated
/// statistics cannot be patched after the fact, so nothing here is retried.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Configuration {
        #[from]
        source: ConfigError,
    },

    #[error("Geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Grid error: {source}")]
    Grid {
        #[from]
        source: GridError,
    },

    #[error(
        "box extent along {axis} changed after grid binding (expected {expected:.6}, observed {observed:.6}); box size should be fixed, use fractional coordinates instead"
    )]
    VolatileBox {
        axis: &'static str,
        expected: f64,
        observed: f64,
    },

    #[error("upstream store has no sample for index {index}")]
    MissingSample { index: usize },
}
