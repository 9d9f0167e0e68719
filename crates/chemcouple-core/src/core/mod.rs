//! # Core Module
//!
//! Building blocks shared by the engine and workflow layers.
//!
//! - **Chemical entities** ([`models`]) - Aqueous solutions, phases, kinetic reactants,
//!   surface sites, secondary variables, rates, knobs and the node index map
//! - **Transport seam** ([`transport`]) - Indexed access to the transport solver's global
//!   vectors and the bindings between transport quantities and chemical components
//! - **Engine text protocol** ([`io`]) - Input script rendering, output schema, result table
//!   parsing and previous-state dumps

pub mod io;
pub mod models;
pub mod transport;
