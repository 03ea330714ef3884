//! Analysis mode registry
//!
//! A mode is one way of looking at audio files (waveform, spectrogram, ...).
//! Every mode independently declares three shapes:
//!
//! - **computed data**: what the kernel computes from the audio for one file
//! - **file state**: the subset of [`FileState`] the mode reads; this is the
//!   body sent to the kernel
//! - **mode state**: per-pane configuration of the mode, independent of files
//!
//! Adding a mode means adding a module with a [`Mode`] implementation, a
//! [`ModeName`] variant, a [`ComputedData`] variant and a [`ModeStates`] field.

pub mod error_rate;
pub mod simple_info;
pub mod spectrogram;
pub mod transcription;
pub mod vowel_space;
pub mod waveform;

use crate::state::FileState;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use error_rate::ErrorRate;
pub use simple_info::SimpleInfo;
pub use spectrogram::Spectrogram;
pub use transcription::TranscriptionMode;
pub use vowel_space::VowelSpace;
pub use waveform::Waveform;

/// Schema declaration of an analysis mode
pub trait Mode {
    const NAME: ModeName;

    /// Data computed by the kernel from the audio file
    type ComputedData: DeserializeOwned + Serialize;

    /// Fields of [`FileState`] the mode depends on
    type FileState: DeserializeOwned + Serialize + Default;

    /// Per-pane configuration of the mode
    type ModeState: DeserializeOwned + Serialize + Default + Clone + PartialEq + fmt::Debug;

    /// Validate a kernel response
    fn parse_computed(value: Value) -> Result<Self::ComputedData> {
        Ok(serde_json::from_value(value)?)
    }

    /// Project the full file state onto the fields this mode declares
    fn pick_file_state(state: &FileState) -> Result<Self::FileState> {
        Ok(serde_json::from_value(serde_json::to_value(state)?)?)
    }

    /// Validate a mode state, filling in defaults. `null` yields the default.
    fn parse_mode_state(value: &Value) -> Result<Self::ModeState> {
        if value.is_null() {
            return Ok(Self::ModeState::default());
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Name of a registered mode
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ModeName {
    #[default]
    SimpleInfo,
    Waveform,
    Spectrogram,
    Transcription,
    VowelSpace,
    ErrorRate,
}

impl ModeName {
    /// All modes in registry order
    pub const ALL: [ModeName; 6] = [
        ModeName::SimpleInfo,
        ModeName::Waveform,
        ModeName::Spectrogram,
        ModeName::Transcription,
        ModeName::VowelSpace,
        ModeName::ErrorRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeName::SimpleInfo => "simple-info",
            ModeName::Waveform => "waveform",
            ModeName::Spectrogram => "spectrogram",
            ModeName::Transcription => "transcription",
            ModeName::VowelSpace => "vowel-space",
            ModeName::ErrorRate => "error-rate",
        }
    }
}

impl fmt::Display for ModeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModeName::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown mode: {}", s)))
    }
}

/// Validated kernel output, one variant per mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComputedData {
    SimpleInfo(<SimpleInfo as Mode>::ComputedData),
    Waveform(<Waveform as Mode>::ComputedData),
    Spectrogram(<Spectrogram as Mode>::ComputedData),
    Transcription(<TranscriptionMode as Mode>::ComputedData),
    VowelSpace(<VowelSpace as Mode>::ComputedData),
    ErrorRate(<ErrorRate as Mode>::ComputedData),
}

impl ComputedData {
    pub fn mode(&self) -> ModeName {
        match self {
            ComputedData::SimpleInfo(_) => ModeName::SimpleInfo,
            ComputedData::Waveform(_) => ModeName::Waveform,
            ComputedData::Spectrogram(_) => ModeName::Spectrogram,
            ComputedData::Transcription(_) => ModeName::Transcription,
            ComputedData::VowelSpace(_) => ModeName::VowelSpace,
            ComputedData::ErrorRate(_) => ModeName::ErrorRate,
        }
    }
}

fn computed<M: Mode>(mode: ModeName, value: Value) -> Result<M::ComputedData> {
    debug_assert_eq!(M::NAME, mode);
    M::parse_computed(value)
}

/// Validate a kernel response against the computed-data shape of `mode`
pub fn parse_computed_data(mode: ModeName, value: Value) -> Result<ComputedData> {
    Ok(match mode {
        ModeName::SimpleInfo => ComputedData::SimpleInfo(computed::<SimpleInfo>(mode, value)?),
        ModeName::Waveform => ComputedData::Waveform(computed::<Waveform>(mode, value)?),
        ModeName::Spectrogram => ComputedData::Spectrogram(computed::<Spectrogram>(mode, value)?),
        ModeName::Transcription => {
            ComputedData::Transcription(computed::<TranscriptionMode>(mode, value)?)
        }
        ModeName::VowelSpace => ComputedData::VowelSpace(computed::<VowelSpace>(mode, value)?),
        ModeName::ErrorRate => ComputedData::ErrorRate(computed::<ErrorRate>(mode, value)?),
    })
}

fn picked<M: Mode>(mode: ModeName, state: &FileState) -> Result<Value> {
    debug_assert_eq!(M::NAME, mode);
    Ok(serde_json::to_value(M::pick_file_state(state)?)?)
}

/// The part of `state` that `mode` declares, as sent to the kernel
pub fn pick_file_state(mode: ModeName, state: &FileState) -> Result<Value> {
    match mode {
        ModeName::SimpleInfo => picked::<SimpleInfo>(mode, state),
        ModeName::Waveform => picked::<Waveform>(mode, state),
        ModeName::Spectrogram => picked::<Spectrogram>(mode, state),
        ModeName::Transcription => picked::<TranscriptionMode>(mode, state),
        ModeName::VowelSpace => picked::<VowelSpace>(mode, state),
        ModeName::ErrorRate => picked::<ErrorRate>(mode, state),
    }
}

fn validated_mode_state<M: Mode>(mode: ModeName, value: &Value) -> Result<Value> {
    debug_assert_eq!(M::NAME, mode);
    Ok(serde_json::to_value(M::parse_mode_state(value)?)?)
}

/// Validate and default a mode state for `mode`
pub fn parse_mode_state(mode: ModeName, value: &Value) -> Result<Value> {
    match mode {
        ModeName::SimpleInfo => validated_mode_state::<SimpleInfo>(mode, value),
        ModeName::Waveform => validated_mode_state::<Waveform>(mode, value),
        ModeName::Spectrogram => validated_mode_state::<Spectrogram>(mode, value),
        ModeName::Transcription => validated_mode_state::<TranscriptionMode>(mode, value),
        ModeName::VowelSpace => validated_mode_state::<VowelSpace>(mode, value),
        ModeName::ErrorRate => validated_mode_state::<ErrorRate>(mode, value),
    }
}

/// Default mode state for `mode`
pub fn default_mode_state(mode: ModeName) -> Value {
    // Every mode state accepts null, so this cannot fail.
    parse_mode_state(mode, &Value::Null).unwrap_or(Value::Object(Default::default()))
}

/// One mode state per mode, as kept by a pane
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ModeStates {
    pub simple_info: <SimpleInfo as Mode>::ModeState,
    pub waveform: <Waveform as Mode>::ModeState,
    pub spectrogram: <Spectrogram as Mode>::ModeState,
    pub transcription: <TranscriptionMode as Mode>::ModeState,
    pub vowel_space: <VowelSpace as Mode>::ModeState,
    pub error_rate: <ErrorRate as Mode>::ModeState,
}

impl ModeStates {
    /// The state of one mode as JSON
    pub fn get(&self, mode: ModeName) -> Result<Value> {
        Ok(match mode {
            ModeName::SimpleInfo => serde_json::to_value(&self.simple_info)?,
            ModeName::Waveform => serde_json::to_value(&self.waveform)?,
            ModeName::Spectrogram => serde_json::to_value(&self.spectrogram)?,
            ModeName::Transcription => serde_json::to_value(&self.transcription)?,
            ModeName::VowelSpace => serde_json::to_value(&self.vowel_space)?,
            ModeName::ErrorRate => serde_json::to_value(&self.error_rate)?,
        })
    }

    /// Replace the state of one mode after validating it
    pub fn set(&mut self, mode: ModeName, value: &Value) -> Result<()> {
        match mode {
            ModeName::SimpleInfo => self.simple_info = SimpleInfo::parse_mode_state(value)?,
            ModeName::Waveform => self.waveform = Waveform::parse_mode_state(value)?,
            ModeName::Spectrogram => self.spectrogram = Spectrogram::parse_mode_state(value)?,
            ModeName::Transcription => {
                self.transcription = TranscriptionMode::parse_mode_state(value)?
            }
            ModeName::VowelSpace => self.vowel_space = VowelSpace::parse_mode_state(value)?,
            ModeName::ErrorRate => self.error_rate = ErrorRate::parse_mode_state(value)?,
        }
        Ok(())
    }
}

/// Mode state for modes without configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmptyModeState {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_declarations_match_registry() {
        assert_eq!(SimpleInfo::NAME, ModeName::SimpleInfo);
        assert_eq!(Waveform::NAME, ModeName::Waveform);
        assert_eq!(Spectrogram::NAME, ModeName::Spectrogram);
        assert_eq!(TranscriptionMode::NAME, ModeName::Transcription);
        assert_eq!(VowelSpace::NAME, ModeName::VowelSpace);
        assert_eq!(ErrorRate::NAME, ModeName::ErrorRate);
        assert_eq!(ModeName::default(), ModeName::SimpleInfo);
    }

    #[test]
    fn test_mode_names_round_trip_through_strings() {
        for mode in ModeName::ALL {
            assert_eq!(mode.as_str().parse::<ModeName>().unwrap(), mode);
            assert_eq!(serde_json::to_value(mode).unwrap(), json!(mode.as_str()));
        }
        assert!("pitch".parse::<ModeName>().is_err());
    }

    #[test]
    fn test_default_mode_states() {
        assert_eq!(default_mode_state(ModeName::VowelSpace), json!({"showLegend": true}));
        assert_eq!(default_mode_state(ModeName::Waveform), json!({"width": 100.0}));
        assert_eq!(default_mode_state(ModeName::ErrorRate), json!({}));
    }

    #[test]
    fn test_mode_states_fill_missing_modes() {
        let states: ModeStates =
            serde_json::from_value(json!({"vowel-space": {"showLegend": false}})).unwrap();
        assert!(!states.vowel_space.show_legend);
        assert_eq!(states.get(ModeName::Spectrogram).unwrap(), json!({"width": 100.0}));
    }

    #[test]
    fn test_mode_states_set_validates() {
        let mut states = ModeStates::default();
        assert!(states.set(ModeName::VowelSpace, &json!({"showLegend": 1})).is_err());
        states
            .set(ModeName::Waveform, &json!({"width": 250}))
            .unwrap();
        assert_eq!(states.waveform.width, 250.0);
    }

    #[test]
    fn test_pick_file_state_only_keeps_declared_fields() {
        let state = FileState {
            id: "f1".to_string(),
            name: "one.wav".to_string(),
            cycle_enabled: true,
            ..FileState::default()
        };

        assert_eq!(
            pick_file_state(ModeName::Transcription, &state).unwrap(),
            json!({"id": "f1"})
        );
        assert_eq!(
            pick_file_state(ModeName::SimpleInfo, &state).unwrap(),
            json!({"id": "f1", "name": "one.wav", "frame": null})
        );
    }

    #[test]
    fn test_parse_computed_data_dispatches_by_mode() {
        let data = parse_computed_data(ModeName::Transcription, Value::Null).unwrap();
        assert_eq!(data.mode(), ModeName::Transcription);

        assert!(parse_computed_data(ModeName::Waveform, json!({"pitch": "high"})).is_err());
    }
}
