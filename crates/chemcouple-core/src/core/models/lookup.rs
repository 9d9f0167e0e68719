use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Component,
    EquilibriumPhase,
    KineticReactant,
    SurfaceSite,
    SecondaryVariable,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EntityKind::Component => "component",
                EntityKind::EquilibriumPhase => "equilibrium phase",
                EntityKind::KineticReactant => "kinetic reactant",
                EntityKind::SurfaceSite => "surface site",
                EntityKind::SecondaryVariable => "secondary variable",
            }
        )
    }
}

/// Raised when an entity referenced by name does not exist.
///
/// This always means the input script and the output schema were generated from
/// inconsistent configurations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Could not find {kind} '{name}'")]
pub struct LookupError {
    pub kind: EntityKind,
    pub name: String,
}

pub trait Named {
    const KIND: EntityKind;

    fn name(&self) -> &str;
}

pub fn position_by_name<T: Named>(items: &[T], name: &str) -> Result<usize, LookupError> {
    items
        .iter()
        .position(|item| item.name() == name)
        .ok_or_else(|| LookupError {
            kind: T::KIND,
            name: name.to_string(),
        })
}

pub fn find_by_name<'a, T: Named>(items: &'a [T], name: &str) -> Result<&'a T, LookupError> {
    position_by_name(items, name).map(|idx| &items[idx])
}

pub fn find_by_name_mut<'a, T: Named>(
    items: &'a mut [T],
    name: &str,
) -> Result<&'a mut T, LookupError> {
    let idx = position_by_name(items, name)?;
    Ok(&mut items[idx])
}

/// Returns the first name that occurs more than once.
pub fn first_duplicate_name<T: Named>(items: &[T]) -> Option<&str> {
    items.iter().enumerate().find_map(|(i, item)| {
        items[..i]
            .iter()
            .any(|earlier| earlier.name() == item.name())
            .then(|| item.name())
    })
}
