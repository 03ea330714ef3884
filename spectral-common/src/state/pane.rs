//! State of an analysis pane

use super::FileState;
use crate::modes::{ModeName, ModeStates};
use serde::{Deserialize, Serialize};

/// A pane shows a set of files through one mode at a time.
///
/// Mode states are kept for every mode so switching modes back and forth
/// does not lose configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaneState {
    pub id: String,
    pub title: String,
    pub mode: ModeName,
    pub files: Vec<FileState>,
    pub mode_state: ModeStates,
}

pub const DEFAULT_PANE_ID: &str = "default-pane";

impl Default for PaneState {
    fn default() -> Self {
        Self {
            id: DEFAULT_PANE_ID.to_string(),
            title: "Pane".to_string(),
            mode: ModeName::default(),
            files: Vec::new(),
            mode_state: ModeStates::default(),
        }
    }
}

impl PaneState {
    pub fn new(id: impl Into<String>, title: impl Into<String>, mode: ModeName) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            mode,
            ..Self::default()
        }
    }

    /// Whether the pane shows the file with the given id
    pub fn contains_file(&self, file_id: &str) -> bool {
        self.files.iter().any(|file| file.id == file_id)
    }
}
