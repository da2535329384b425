// src/lib.rs

pub mod config;
pub mod core;
pub mod daily_log;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod weekly;

pub use crate::config::EngineConfig;
pub use crate::core::engine::MenuEngine;
pub use crate::core::types::{DietProfile, MenuAssignment};
pub use crate::error::MenuError;
