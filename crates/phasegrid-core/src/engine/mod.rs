//! # Engine Module
//!
//! This module implements the stateful accumulation engine: one full update
//! cycle per scheduled simulation step, from pulling active particle samples
//! out of the upstream store to merging kernel contributions into the grid.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Axis selection, bin layout, bandwidths,
//!   kernel family, memory policy, and eager validation of the whole surface
//! - **Geometry** ([`geometry`]) - Mapping particle positions into 1-3 grid
//!   coordinates relative to a per-frame origin
//! - **Spreading** ([`spread`]) - Enumerating the kernel stencil around a
//!   mapped point, with periodic wraparound across grid seams
//! - **Upstream Interfaces** ([`source`]) - The contract with the external
//!   particle-value store
//! - **Orchestration** ([`accumulator`]) - The per-frame state machine tying
//!   the above together and advancing the normalization counters
//! - **Error Handling** ([`error`]) - Engine-level error taxonomy
//!
//! Per-particle mapping and spreading within one frame is embarrassingly
//! parallel; with the `parallel` feature the inner loop runs on rayon and
//! contributions are merged by commutative addition.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod geometry;
pub mod source;
pub mod spread;
