//! Command handlers for the `nexus` binary.
//!
//! Each handler writes human-readable output to the supplied writer so the
//! commands can be driven from tests.

pub mod analyze;
pub mod format;
pub mod sample;
pub mod states;

/// State config used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/state_config.yaml";
