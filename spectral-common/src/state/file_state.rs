//! Per-file state shared between all modes

use crate::{Frame, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single timed caption of a transcription track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Caption {
    pub value: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Default for Caption {
    fn default() -> Self {
        Self {
            value: "broken-value".to_string(),
            start: 0.0,
            end: 0.0,
        }
    }
}

/// A named transcription track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transcription {
    pub id: String,
    pub name: String,
    pub captions: Vec<Caption>,
}

impl Default for Transcription {
    fn default() -> Self {
        Self {
            id: "broken-track-id".to_string(),
            name: "broken-track-name".to_string(),
            captions: Vec::new(),
        }
    }
}

/// State associated with a file.
///
/// Shared between all modes: a value set by one mode is visible to every
/// other mode that picks the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileState {
    pub id: String,
    pub name: String,
    pub frame: Option<Frame>,
    pub cycle_enabled: bool,
    pub transcriptions: Vec<Transcription>,
    pub ground_truth: Option<String>,
    pub note: Option<String>,
    /// Ground-truth track used for error-rate scoring
    pub reference: Option<Transcription>,
    /// Track scored against `reference`
    pub hypothesis: Option<Transcription>,
}

impl Default for FileState {
    fn default() -> Self {
        Self {
            id: "broken-file-id".to_string(),
            name: "broken-filename".to_string(),
            frame: None,
            cycle_enabled: false,
            transcriptions: Vec::new(),
            ground_truth: None,
            note: None,
            reference: None,
            hypothesis: None,
        }
    }
}

impl FileState {
    /// Validate a JSON value and fill in defaults for missing fields.
    ///
    /// `null` yields the fully defaulted state.
    pub fn parse(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }

        Ok(Self::deserialize(value)?)
    }

    /// Default state for a database row that has no usable stored state
    pub fn for_file(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Build the state of a stored file.
    ///
    /// `id` and `name` always come from the database row. A stored state that
    /// is not an object or does not validate is replaced by the default.
    pub fn for_stored_file(id: &str, name: &str, stored: Option<&Value>) -> Self {
        let parsed = match stored {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value @ Value::Object(_)) => Self::parse(value),
            Some(_) => Err(crate::Error::InvalidInput(
                "file state is not an object".to_string(),
            )),
        };

        match parsed {
            Ok(state) => Self {
                id: id.to_string(),
                name: name.to_string(),
                ..state
            },
            Err(e) => {
                warn!(file_id = %id, "Invalid file state in database, using default: {}", e);
                Self::for_file(id, name)
            }
        }
    }
}
