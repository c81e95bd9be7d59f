//! Android-specific tools for Stockly
//!
//! This crate hardens the Android build configuration of the Stockly app:
//! - Structured parsing of Gradle build descriptors
//! - Release-build obfuscation patching (R8/Proguard, resource shrinking)
//! - `gradle.properties` management
//! - On-disk project harness used by the `stockly-android` CLI

#![warn(missing_docs)]

pub mod descriptor;
pub mod parser;
pub mod patcher;
pub mod project;
pub mod properties;

pub use descriptor::GradleDocument;
pub use patcher::{patch_build_gradle, patch_properties, PatchBranch, PatchReport};
pub use project::{AndroidProject, HardenReport};
pub use properties::PropertiesFile;
