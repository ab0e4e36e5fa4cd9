//! Core types and configuration for the nexus analyzer.
//!
//! This crate provides shared types used across all other crates:
//! - Sales records and per-state rule records
//! - Breach results
//! - State rule configuration (YAML)
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigSummary, NexusConfig, StateConfig};
pub use error::{Error, Result};
pub use types::*;
