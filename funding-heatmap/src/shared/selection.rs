//! Which asset, if any, is open in the detail popup
//!
//! Holds a name only. The record is looked up in the current catalog at render
//! time, and a refresh that no longer carries the name dismisses the popup.

use super::{catalog::Catalog, types::AssetRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, name: impl Into<String>) {
        self.selected = Some(name.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Current record for the selected name, if the catalog still has it
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Option<&'a AssetRecord> {
        self.selected.as_deref().and_then(|name| catalog.get(name))
    }

    /// Auto-dismiss when the selected asset vanished from a new snapshot.
    /// Returns true if the selection was cleared.
    pub fn reconcile(&mut self, catalog: &Catalog) -> bool {
        match self.selected.as_deref() {
            Some(name) if !catalog.contains(name) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }
}
