use crate::channel::MessagePort;
use crate::core::util::HashMap;
use crate::protocol::ArtworkId;

use super::instance::ArtworkInstance;
use super::page::{ArtworkTarget, ErrorSlot, PlayPauseState};

/// Everything the controller owns for one live artwork.
pub struct InstanceEntry {
    pub instance: ArtworkInstance,
    pub port: Box<dyn MessagePort>,
    pub target: Box<dyn ArtworkTarget>,
    pub error_slot: Option<Box<dyn ErrorSlot>>,
    pub autosize: bool,
    pub controls: Option<PlayPauseState>,
}

/// Explicit id -> instance lookup used by the dispatcher, in registration
/// order.
#[derive(Default)]
pub struct InstanceRegistry {
    entries: HashMap<ArtworkId, InstanceEntry>,
    ordered_ids: Vec<ArtworkId>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_vacant(&self, id: &ArtworkId) -> Result<(), String> {
        if self.entries.contains_key(id) {
            return Err(format!("duplicate artwork registration: {}", id));
        }
        Ok(())
    }

    pub fn insert(&mut self, entry: InstanceEntry) -> Result<(), String> {
        let id = entry.instance.id().clone();
        self.ensure_vacant(&id)?;

        self.ordered_ids.push(id.clone());
        self.entries.insert(id, entry);

        Ok(())
    }

    pub fn remove(&mut self, id: &ArtworkId) -> Option<InstanceEntry> {
        let entry = self.entries.remove(id)?;
        self.ordered_ids.retain(|existing| existing != id);
        Some(entry)
    }

    pub fn contains(&self, id: &ArtworkId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &ArtworkId) -> Option<&InstanceEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ArtworkId) -> Option<&mut InstanceEntry> {
        self.entries.get_mut(id)
    }

    pub fn ids(&self) -> &[ArtworkId] {
        &self.ordered_ids
    }

    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }
}
