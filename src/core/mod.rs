// src/core/mod.rs
//! Configuration and database plumbing shared by the CLI and the stores

pub mod config_manager;
pub mod database;

pub use config_manager::{ConfigManager, ProviderMode};
pub use database::Database;
