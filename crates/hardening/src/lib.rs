//! Platform dispatch for Stockly build hardening
//!
//! Thin composition layer over the platform crates: decides per platform
//! whether the hardening pass runs, based on the loaded configuration.

#![warn(missing_docs)]

pub mod dispatcher;

pub use dispatcher::{Dispatcher, PlatformOutcome};
