//! # Core Module
//!
//! This module provides the fundamental building blocks for kernel-smoothed
//! field construction, serving as the stateless computational foundation of
//! the library.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of the problem:
//!
//! - **Physical Representation** ([`models`]) - Simulation cells, periodic
//!   geometry, and per-particle samples
//! - **Grid Storage** ([`grid`]) - Axis descriptors and the dense accumulation
//!   array with its normalization counters
//! - **Smoothing Kernels** ([`kernels`]) - Kernel-family evaluation primitives
//!   and the registry through which families are selected by name

pub mod grid;
pub mod kernels;
pub mod models;
