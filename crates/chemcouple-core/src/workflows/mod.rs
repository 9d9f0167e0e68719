//! # Workflows Module
//!
//! High-level entry points that run complete coupling calls against an engine.
//!
//! ## Overview
//!
//! A transport simulation owns the global concentration vectors and calls into this layer
//! once before time stepping ([`coupling::CouplingOrchestrator::initial_calculation`]) and
//! once per time step ([`coupling::CouplingOrchestrator::step`]). Each call pulls the
//! transported quantities into the chemical systems, writes and runs an engine script, reads
//! the reacted state back and pushes it into the vectors again.
//!
//! ## Architecture
//!
//! - **Coupling Workflow** ([`coupling`]) - The orchestrator owning the chemical systems, the
//!   output schema, the previous-state dump and the engine driver.

pub mod coupling;
