//! Transcription mode: editing of transcription tracks.
//!
//! Nothing is computed by the kernel for this mode; transcriptions are
//! generated through the kernel's transcription endpoint instead.

use super::{EmptyModeState, Mode, ModeName};
use crate::state::FileState;
use serde::{Deserialize, Serialize};

pub struct TranscriptionMode;

impl Mode for TranscriptionMode {
    const NAME: ModeName = ModeName::Transcription;
    type ComputedData = ();
    type FileState = TranscriptionFileState;
    type ModeState = EmptyModeState;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionFileState {
    pub id: String,
}

impl Default for TranscriptionFileState {
    fn default() -> Self {
        Self {
            id: FileState::default().id,
        }
    }
}
