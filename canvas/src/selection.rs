//! Single-layer selection gating the property panel.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::{LayerId, LayerStore};

/// Which single layer the property panel edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionModel {
    active: Option<LayerId>,
}

impl SelectionModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id` if it exists in `store`. Unknown ids leave the selection
    /// unchanged and return `false`.
    pub fn select(&mut self, id: LayerId, store: &LayerStore) -> bool {
        if !store.contains(&id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Clear the selection if it points at `id`. Returns whether it did.
    pub fn forget(&mut self, id: &LayerId) -> bool {
        if self.active.as_ref() == Some(id) {
            self.active = None;
            return true;
        }
        false
    }

    #[must_use]
    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    #[must_use]
    pub fn is_selected(&self, id: &LayerId) -> bool {
        self.active.as_ref() == Some(id)
    }
}
