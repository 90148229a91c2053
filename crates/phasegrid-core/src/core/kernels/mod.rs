//! # Smoothing Kernels
//!
//! Kernel-function evaluation primitives for spreading a particle's scalar
//! value onto nearby grid cells, together with the registry through which a
//! kernel family is selected by name at construction time.
//!
//! All kernels here are radial in the bandwidth-scaled distance
//! `u = sqrt(sum_i (d_i / sigma_i)^2)` and return un-normalized weights with a
//! peak value of one at zero displacement. Whether the accumulated field is
//! reported normalized by the total deposited weight is a read-time concern of
//! the grid store, not of the kernels.

pub mod functions;
pub mod registry;

pub use functions::KernelFunction;
pub use registry::KernelRegistry;
