//! Vowel space mode: F1/F2 plot of the selected frame and matching captions

use super::{Mode, ModeName};
use crate::state::{FileState, Transcription};
use crate::Frame;
use serde::{Deserialize, Serialize};

pub struct VowelSpace;

impl Mode for VowelSpace {
    const NAME: ModeName = ModeName::VowelSpace;
    type ComputedData = Option<VowelSpaceData>;
    type FileState = VowelSpaceFileState;
    type ModeState = VowelSpaceModeState;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VowelSpaceData {
    pub formants: Vec<VowelSpacePoint>,
}

/// One point in the vowel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VowelSpacePoint {
    /// First formant, in Hz
    pub f1: f64,
    /// Second formant, in Hz
    pub f2: f64,
    /// Caption the point was taken from; `None` for the selected frame
    #[serde(default)]
    pub match_string: Option<String>,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VowelSpaceFileState {
    pub id: String,
    pub name: String,
    pub frame: Option<Frame>,
    pub transcriptions: Vec<Transcription>,
}

impl Default for VowelSpaceFileState {
    fn default() -> Self {
        let FileState {
            id,
            name,
            frame,
            transcriptions,
            ..
        } = FileState::default();
        Self {
            id,
            name,
            frame,
            transcriptions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VowelSpaceModeState {
    pub show_legend: bool,
}

impl Default for VowelSpaceModeState {
    fn default() -> Self {
        Self { show_legend: true }
    }
}
