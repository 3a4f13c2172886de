//! Persistence for a built [`crate::NavMesh`].
//!
//! The persisted format is schema-versioned and carries no embedded Rust
//! type paths — only plain data — so a future internal refactor that
//! renames or restructures a type can't silently corrupt old saves. The
//! spatial index is never part of the envelope; it's rebuilt by
//! [`crate::NavMesh::from_bytes`] after every load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entrance::Entrance;
use crate::graph::{Node0, Node1};
use crate::zone::Zone;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode nav-mesh: {0}")]
    Encode(#[from] bincode::Error),
    #[error("persisted nav-mesh has schema version {found}, this build supports {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
}

#[derive(Serialize, Deserialize)]
pub(crate) struct PersistedNavMesh {
    schema_version: u32,
    pub(crate) level0: Vec<Node0>,
    pub(crate) level1: Vec<Node1>,
    pub(crate) zones: Vec<Zone>,
    pub(crate) entrances: Vec<Entrance>,
}

impl PersistedNavMesh {
    pub(crate) fn new(level0: Vec<Node0>, level1: Vec<Node1>, zones: Vec<Zone>, entrances: Vec<Entrance>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            level0,
            level1,
            zones,
            entrances,
        }
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        Ok(bincode::serialize(self)?)
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        let persisted: PersistedNavMesh = bincode::deserialize(bytes)?;
        if persisted.schema_version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedSchema {
                found: persisted.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(persisted)
    }
}
