//! # Chemical Entity Models
//!
//! Value types describing the chemistry attached to every node that takes part in the
//! coupling. Two storage shapes coexist:
//!
//! - **Scalar per system**: [`solution::AqueousSolution`] exists once per chemical system and
//!   is addressed by its local position.
//! - **Array over all systems**: [`phases::EquilibriumPhase`], [`phases::KineticReactant`],
//!   [`phases::SurfaceSite`] and [`user_punch::SecondaryVariable`] are configured once and keep
//!   one value per global node id.
//!
//! - [`ids`] - Mapping between local system positions and global node ids
//! - [`lookup`] - Name lookup with an explicit not-found failure
//! - [`system`] - The collection of all entities owned by one coupling

pub mod ids;
pub mod knobs;
pub mod lookup;
pub mod phases;
pub mod rates;
pub mod solution;
pub mod system;
pub mod user_punch;
