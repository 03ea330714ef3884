//! Waveform mode: pitch and formant tracks over the whole file

use super::{Mode, ModeName};
use crate::state::FileState;
use crate::Frame;
use serde::{Deserialize, Serialize};

pub struct Waveform;

impl Mode for Waveform {
    const NAME: ModeName = ModeName::Waveform;
    type ComputedData = WaveformData;
    type FileState = WaveformFileState;
    type ModeState = WaveformModeState;
}

/// Pitch and formant tracks; unvoiced or unmeasurable frames are `null`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformData {
    pub pitch: Vec<Option<f64>>,
    pub formants: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformFileState {
    pub id: String,
    pub frame: Option<Frame>,
}

impl Default for WaveformFileState {
    fn default() -> Self {
        let FileState { id, frame, .. } = FileState::default();
        Self { id, frame }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformModeState {
    /// Horizontal zoom, in percent
    pub width: f64,
}

impl Default for WaveformModeState {
    fn default() -> Self {
        Self { width: 100.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_samples_are_allowed() {
        let data = Waveform::parse_computed(json!({
            "pitch": [120.0, null, 118.5],
            "formants": [[700.0, 1200.0], [null, null]]
        }))
        .unwrap();
        assert_eq!(data.pitch[1], None);
        assert_eq!(data.formants.len(), 2);
    }
}
