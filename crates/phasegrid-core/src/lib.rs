//! # Phasegrid Core Library
//!
//! A library for turning discrete, per-particle order parameters into continuous
//! fields: each particle's scalar value is spread onto a fixed-resolution spatial
//! grid through a smoothing kernel, and contributions are averaged over the frames
//! of a simulation trajectory.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict two-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`SimulationCell`,
//!   `ParticleSample`), the dense grid storage (`GridStore`), and the kernel-function
//!   catalogue with its explicit registry.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the per-frame
//!   accumulation cycle. It maps particle positions into grid coordinates
//!   (`GeometryMapper`), enumerates the kernel stencil around each mapped point
//!   (`KernelSpreader`), and drives the multi-frame statistical accumulation
//!   (`AccumulationController`) under cumulative or block-averaging policies.
//!
//! Downstream consumers (file formatters, visualization exporters) only need the
//! read interface of [`core::grid::GridStore`] together with its axis metadata.

pub mod core;
pub mod engine;
