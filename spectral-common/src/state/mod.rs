//! Analysis state schemas
//!
//! State is stored as JSON and may have been written by an older (or newer)
//! version of the service. Every field carries a default so partial objects
//! parse into complete state; unknown keys are dropped; fields of the wrong
//! type are validation errors.

mod file_state;
mod pane;
mod session;

pub use file_state::{Caption, FileState, Transcription};
pub use pane::PaneState;
pub use session::SessionState;
