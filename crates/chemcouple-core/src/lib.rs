//! # chemcouple Core Library
//!
//! Couples a transport simulation to an external, PHREEQC-compatible batch geochemistry
//! engine. Every coupling step pulls per-node concentrations out of the transport solver's
//! global vectors, renders them into an engine input script, runs the engine, parses its
//! selected-output table and pushes the updated state back into the global vectors.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless chemical entity models (solutions, phases,
//!   kinetic reactants, surface sites, user punch outputs), the transport vector seam, and the
//!   text I/O for the engine protocol (script writer, output schema, result reader, dump).
//!
//! - **[`engine`]: The Engine Layer.** The `Engine` abstraction over one engine instance,
//!   the driver that owns it, the child-process backend, configuration and the error type
//!   every fatal failure is reported through.
//!
//! - **[`workflows`]: The Public API.** The coupling orchestrator that sequences
//!   set state, write, execute, read and update for the initial calculation and for each
//!   time step.

pub mod core;
pub mod engine;
pub mod workflows;
