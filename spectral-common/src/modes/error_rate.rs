//! Error rate mode: scoring of a hypothesis track against the reference

use super::{EmptyModeState, Mode, ModeName};
use crate::state::{FileState, Transcription};
use serde::{Deserialize, Serialize};

pub struct ErrorRate;

impl Mode for ErrorRate {
    const NAME: ModeName = ModeName::ErrorRate;
    type ComputedData = Option<ErrorRateData>;
    type FileState = ErrorRateFileState;
    type ModeState = EmptyModeState;
}

/// Error rates of a file. All rates are fractions, not percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRateData {
    pub word_level: WordLevel,
    pub character_level: CharacterLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordLevel {
    /// Word error rate
    pub wer: f64,
    /// Match error rate
    pub mer: f64,
    /// Word information lost
    pub wil: f64,
    /// Word information preserved
    pub wip: f64,
    pub bert: f64,
    pub jaro_winkler: f64,
    #[serde(flatten)]
    pub common: Measures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterLevel {
    /// Character error rate
    pub cer: f64,
    #[serde(flatten)]
    pub common: Measures,
}

/// Counts and alignment shared by word and character level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    pub hits: i64,
    pub substitutions: i64,
    pub deletions: i64,
    pub insertions: i64,
    /// Ground-truth tokens
    pub reference: Vec<String>,
    /// Tokens of the scored transcription
    pub hypothesis: Vec<String>,
    pub alignments: Vec<Alignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentKind {
    Insert,
    Substitute,
    Delete,
    Equal,
}

/// A matching slice of the reference and hypothesis token arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    #[serde(rename = "type")]
    pub kind: AlignmentKind,
    pub reference_start_index: i64,
    pub reference_end_index: i64,
    pub hypothesis_start_index: i64,
    pub hypothesis_end_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorRateFileState {
    pub id: String,
    pub name: String,
    pub transcriptions: Vec<Transcription>,
    pub reference: Option<Transcription>,
    pub hypothesis: Option<Transcription>,
}

impl Default for ErrorRateFileState {
    fn default() -> Self {
        let FileState {
            id,
            name,
            transcriptions,
            reference,
            hypothesis,
            ..
        } = FileState::default();
        Self {
            id,
            name,
            transcriptions,
            reference,
            hypothesis,
        }
    }
}
