//! Database models and queries

pub mod admin;
pub mod auth_sessions;
pub mod files;
pub mod init;
pub mod models;
pub mod seeding;
pub mod sessions;
pub mod users;

pub use init::init_database;
pub use models::*;
