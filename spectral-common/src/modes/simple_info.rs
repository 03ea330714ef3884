//! Simple info mode: duration, pitch and file metadata

use super::{EmptyModeState, Mode, ModeName};
use crate::state::FileState;
use crate::Frame;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub struct SimpleInfo;

impl Mode for SimpleInfo {
    const NAME: ModeName = ModeName::SimpleInfo;
    type ComputedData = SimpleInfoData;
    type FileState = SimpleInfoFileState;
    type ModeState = EmptyModeState;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleInfoData {
    /// Duration of the file, in seconds
    pub duration: f64,
    /// Average pitch over all frames of the file
    pub average_pitch: f64,
    /// Size of the file, in bytes
    pub file_size: u64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub file_creation_date: DateTime<Utc>,
    /// Analysis of the selected frame, if any
    pub frame: Option<FrameInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub duration: f64,
    pub pitch: Option<f64>,
    pub f1: Option<f64>,
    pub f2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleInfoFileState {
    pub id: String,
    pub name: String,
    pub frame: Option<Frame>,
}

impl Default for SimpleInfoFileState {
    fn default() -> Self {
        let FileState { id, name, frame, .. } = FileState::default();
        Self { id, name, frame }
    }
}

/// Accepts RFC 3339 timestamps as well as the zone-less timestamps the
/// kernel's database produces, which are taken to be UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_kernel_response() {
        let data = SimpleInfo::parse_computed(json!({
            "duration": 2.5,
            "averagePitch": 180.2,
            "fileSize": 80044,
            "fileCreationDate": "2024-06-01T10:30:00.123456",
            "frame": {"duration": 0.1, "pitch": null, "f1": 700.0, "f2": 1200.0}
        }))
        .unwrap();

        assert_eq!(data.file_size, 80044);
        assert_eq!(data.file_creation_date.to_rfc3339(), "2024-06-01T10:30:00.123456+00:00");
        assert_eq!(data.frame.unwrap().pitch, None);
    }

    #[test]
    fn test_accepts_rfc3339_dates() {
        let data = SimpleInfo::parse_computed(json!({
            "duration": 1.0,
            "averagePitch": 0.0,
            "fileSize": 1,
            "fileCreationDate": "2024-06-01T10:30:00+02:00",
            "frame": null
        }))
        .unwrap();
        assert_eq!(data.file_creation_date.to_rfc3339(), "2024-06-01T08:30:00+00:00");
    }

    #[test]
    fn test_rejects_garbage_dates() {
        let result = SimpleInfo::parse_computed(json!({
            "duration": 1.0,
            "averagePitch": 0.0,
            "fileSize": 1,
            "fileCreationDate": "yesterday",
            "frame": null
        }));
        assert!(result.is_err());
    }
}
