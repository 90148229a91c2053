//! # Grid Storage
//!
//! The dense accumulation array at the heart of the library: per-axis bin
//! layout descriptors ([`axis::GridAxis`]) and the store that owns the
//! accumulated sums, the companion deposited-weight channel, and the
//! frame-count normalization ([`store::GridStore`]).

pub mod axis;
pub mod store;

pub use axis::GridAxis;
pub use store::{FieldMode, GridError, GridStore};
