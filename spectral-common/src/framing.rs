//! Sample ranges within a decoded audio file

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A range of sample indices `[start_index, end_index)` in the decoded audio data.
///
/// Deserialization rejects frames whose start lies after their end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFrame")]
pub struct Frame {
    start_index: u64,
    end_index: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    start_index: u64,
    end_index: u64,
}

impl TryFrom<RawFrame> for Frame {
    type Error = String;

    fn try_from(raw: RawFrame) -> std::result::Result<Self, Self::Error> {
        Frame::new(raw.start_index, raw.end_index).map_err(|e| e.to_string())
    }
}

impl Frame {
    pub fn new(start_index: u64, end_index: u64) -> Result<Self> {
        if start_index > end_index {
            return Err(Error::InvalidInput(format!(
                "frame start ({}) is after frame end ({})",
                start_index, end_index
            )));
        }

        Ok(Self {
            start_index,
            end_index,
        })
    }

    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    pub fn end_index(&self) -> u64 {
        self.end_index
    }

    /// Number of samples covered by the frame
    pub fn len(&self) -> u64 {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
