// src/core/mod.rs

pub mod catalog;
pub mod diet;
pub mod engine;
pub mod key;
pub mod sampler;
pub mod types;
