// src/lib.rs
//! Tracks LinkedIn profiles over time and flags people who move into
//! founder roles, with a short outreach rationale for each such move.

pub mod cli;
pub mod core;
pub mod discovery;
pub mod insight;
pub mod models;
pub mod provider;
pub mod storage;
pub mod tracking;
pub mod validator;

pub use crate::core::ConfigManager;
pub use crate::tracking::Tracker;
