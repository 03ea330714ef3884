//! # Spectral Common Library
//!
//! Shared code for the Spectral analysis service including:
//! - Analysis state schemas (frames, file/pane/session state)
//! - The mode registry and per-mode computed-data shapes
//! - Kernel HTTP client
//! - Database initialization and queries
//! - Configuration loading
//! - Formatting utilities

pub mod auth;
pub mod color;
pub mod config;
pub mod db;
pub mod error;
pub mod framing;
pub mod kernel;
pub mod modes;
pub mod prompts;
pub mod size;
pub mod state;

pub use error::{Error, Result};
pub use framing::Frame;
pub use modes::{ComputedData, ModeName};
pub use state::{FileState, PaneState, SessionState};
