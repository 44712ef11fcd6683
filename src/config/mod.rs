//! Configuration module for Tycoon-Autopilot
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use tycoon_autopilot::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("autopilot.toml")).unwrap();
//! println!("Lines are stored in {}", config.storage.lines_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AccountConfig, BonusConfig, Config, Credentials, RemoteConfig, ScheduleConfig, StorageConfig,
    DEFAULT_BASE_URL, DEFAULT_CARD_HOLDER_PATH, DEFAULT_USER_AGENT, EMAIL_ENV, PASSWORD_ENV,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
