//! State of a whole session workspace

use super::pane::DEFAULT_PANE_ID;
use super::PaneState;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Layout of a session: its panes, keyed by pane id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub panes: BTreeMap<String, PaneState>,
}

/// Session state as stored, before pane ids are checked
#[derive(Deserialize)]
struct StoredSessionState {
    panes: BTreeMap<String, Value>,
}

impl Default for SessionState {
    fn default() -> Self {
        let mut panes = BTreeMap::new();
        panes.insert(DEFAULT_PANE_ID.to_string(), PaneState::default());
        Self { panes }
    }
}

impl SessionState {
    /// Validate a stored or submitted session state.
    ///
    /// `null` yields the default state. A pane without an `id` takes the key
    /// it is stored under; an explicit `id` must equal that key.
    pub fn parse(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let raw = StoredSessionState::deserialize(value)?;
        let mut panes = BTreeMap::new();

        for (key, mut pane_value) in raw.panes {
            if let Value::Object(fields) = &mut pane_value {
                fields
                    .entry("id")
                    .or_insert_with(|| Value::String(key.clone()));
            }

            let pane = PaneState::deserialize(&pane_value)?;
            if pane.id != key {
                return Err(Error::InvalidInput(format!(
                    "pane stored under '{}' has id '{}'",
                    key, pane.id
                )));
            }
            panes.insert(key, pane);
        }

        Ok(Self { panes })
    }

    /// Add or replace a pane
    pub fn add_pane(&mut self, pane: PaneState) {
        self.panes.insert(pane.id.clone(), pane);
    }

    pub fn remove_pane(&mut self, id: &str) -> Option<PaneState> {
        self.panes.remove(id)
    }

    /// Drop a deleted file from every pane
    pub fn remove_file(&mut self, file_id: &str) {
        for pane in self.panes.values_mut() {
            pane.files.retain(|file| file.id != file_id);
        }
    }
}
