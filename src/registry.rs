//! Network registry: built-in chains followed by user additions

use anyhow::Result;

use crate::constants::{builtin_networks, storage::NETWORKS_KEY};
use crate::storage::KeyValueStore;
use crate::types::ChainDescriptor;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<ChainDescriptor>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NetworkRegistry {
    pub fn builtin() -> Self {
        Self {
            networks: builtin_networks(),
        }
    }

    /// Restore the persisted list, falling back to the built-ins when the key is
    /// absent or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(NETWORKS_KEY) else {
            return Self::builtin();
        };
        match serde_json::from_str::<Vec<ChainDescriptor>>(&raw) {
            Ok(saved) => {
                let mut registry = Self::builtin();
                for network in saved {
                    registry.upsert(network);
                }
                registry
            }
            Err(e) => {
                log::warn!("discarding stored network list: {e}");
                Self::builtin()
            }
        }
    }

    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<()> {
        let raw = serde_json::to_string(&self.networks)?;
        store.set(NETWORKS_KEY, &raw)
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.get(chain_id).is_some()
    }

    /// Append, or replace in place when the chain id is already known, so chain
    /// ids stay unique and display order is stable. Returns true if appended.
    pub fn upsert(&mut self, network: ChainDescriptor) -> bool {
        match self
            .networks
            .iter_mut()
            .find(|n| n.chain_id == network.chain_id)
        {
            Some(existing) => {
                *existing = network;
                false
            }
            None => {
                self.networks.push(network);
                true
            }
        }
    }

    pub fn list(&self) -> &[ChainDescriptor] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
