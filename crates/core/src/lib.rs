//! Core utilities for Stockly development tools
//!
//! This crate provides shared functionality used across all platform-specific tools:
//!
//! - **Error handling**: structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with explicit defaults
//! - **Validation**: config and input validation with an error/warning split
//!
//! # Example
//!
//! ```rust,no_run
//! use stockly_core::config::Config;
//! use stockly_core::validation::validate_config;
//!
//! let config = Config::load(None).expect("config");
//! let report = validate_config(&config.schema);
//!
//! if !report.is_valid() {
//!     eprintln!("Configuration issues detected!");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, HardeningConfig, PlatformToggle};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::validation::{validate_config, ValidationResult, Validator};
}
