use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SystemMapError {
    #[error("Global node id {global_id} is mapped by more than one chemical system")]
    DuplicateGlobalId { global_id: usize },
}

/// Maps the local position of a chemical system to the global id of its mesh node.
///
/// The engine numbers its blocks with `global_id + 1`, so the same mapping is used when the
/// script is written and when the result table is read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChemicalSystemMap {
    global_ids: Vec<usize>,
    local_ids: HashMap<usize, usize>,
}

impl ChemicalSystemMap {
    pub fn new(global_ids: Vec<usize>) -> Result<Self, SystemMapError> {
        let mut local_ids = HashMap::with_capacity(global_ids.len());
        for (local_id, &global_id) in global_ids.iter().enumerate() {
            if local_ids.insert(global_id, local_id).is_some() {
                return Err(SystemMapError::DuplicateGlobalId { global_id });
            }
        }
        Ok(Self {
            global_ids,
            local_ids,
        })
    }

    pub fn identity(num_systems: usize) -> Self {
        Self {
            global_ids: (0..num_systems).collect(),
            local_ids: (0..num_systems).map(|id| (id, id)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.global_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global_ids.is_empty()
    }

    pub fn global_id(&self, local_id: usize) -> Option<usize> {
        self.global_ids.get(local_id).copied()
    }

    pub fn local_id(&self, global_id: usize) -> Option<usize> {
        self.local_ids.get(&global_id).copied()
    }

    /// Number of slots an array-valued entity needs to be addressable by every global id.
    pub fn extent(&self) -> usize {
        self.global_ids.iter().max().map_or(0, |max| max + 1)
    }

    /// Iterates `(local_id, global_id)` pairs in local order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.global_ids.iter().copied().enumerate()
    }

    pub fn global_ids(&self) -> &[usize] {
        &self.global_ids
    }
}

/// Block number the engine uses for the system living on `global_id`.
#[inline]
pub fn block_id(global_id: usize) -> usize {
    global_id + 1
}
