//! iOS-specific tools for Stockly
//!
//! This crate currently covers a single concern: reporting that iOS build
//! hardening is a manual Xcode configuration, with the concrete steps.

#![warn(missing_docs)]

pub mod hardening;

pub use hardening::{hardening_support, manual_steps, HardeningSupport};
