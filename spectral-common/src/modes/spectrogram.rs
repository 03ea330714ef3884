//! Spectrogram mode: formant overlay for the spectrogram

use super::{Mode, ModeName};
use crate::state::FileState;
use crate::Frame;
use serde::{Deserialize, Serialize};

pub struct Spectrogram;

impl Mode for Spectrogram {
    const NAME: ModeName = ModeName::Spectrogram;
    type ComputedData = SpectrogramData;
    type FileState = SpectrogramFileState;
    type ModeState = SpectrogramModeState;
}

/// First five formants per analysis frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramData {
    pub formants: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramFileState {
    pub id: String,
    pub frame: Option<Frame>,
}

impl Default for SpectrogramFileState {
    fn default() -> Self {
        let FileState { id, frame, .. } = FileState::default();
        Self { id, frame }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramModeState {
    pub width: f64,
}

impl Default for SpectrogramModeState {
    fn default() -> Self {
        Self { width: 100.0 }
    }
}
