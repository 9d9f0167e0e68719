//! # Engine Module
//!
//! This module wraps the external geochemistry engine and everything needed to drive it
//! from a coupling: configuration, the engine abstraction and its backends, the driver that
//! owns one engine instance, the coupling phase tracker and the error type.
//!
//! ## Overview
//!
//! The engine is treated as a black box that accepts an input script, a thermodynamic
//! database and two output toggles (selected output and dump), and either succeeds or
//! reports a diagnostic. Nothing here interprets chemistry; the script and result formats
//! live in [`crate::core::io`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Entity templates, transport bindings, file naming and setup validation
//! - **Driver** ([`driver`]) - The [`driver::Engine`] trait and the driver owning exactly one engine
//! - **Process Backend** ([`process`]) - Runs a PHREEQC-compatible executable as a child process
//! - **State Tracking** ([`state`]) - The phase a coupling call is currently in
//! - **Error Handling** ([`error`]) - The single fatal error channel of the crate

pub mod config;
pub mod driver;
pub mod error;
pub mod process;
pub mod state;
