//! HTTP API handlers for spectral-server

pub mod admin;
pub mod analysis;
pub mod auth;
pub mod form;
pub mod health;
pub mod profile;
pub mod proxy;
pub mod recorder;
pub mod sessions;
pub mod storage;

pub use auth::{auth_middleware, CurrentUser};
