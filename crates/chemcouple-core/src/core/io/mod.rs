//! Provides the text protocol spoken with the geochemistry engine.
//!
//! The engine consumes an input script made of keyword blocks and answers with a
//! whitespace-separated selected-output table. Optionally it also dumps raw solution state
//! that is fed back into the next script. Every entity renders itself through the
//! [`traits::ScriptBlock`] and [`traits::SystemBlock`] traits; [`script`] composes them in the
//! order the engine expects and [`results`] routes the table back using the [`output`] schema.

pub mod dump;
pub mod output;
pub mod results;
pub mod script;
pub mod traits;
