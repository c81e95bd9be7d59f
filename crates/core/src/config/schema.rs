//! Configuration schema definitions
//!
//! Shared configuration types for all platforms. Defaults are materialized
//! here, once, at deserialization time; downstream code reads plain fields
//! and never re-derives "absent means enabled" on its own.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// General project configuration
    #[serde(default)]
    pub general: GeneralConfig,

    /// Build hardening configuration
    #[serde(default)]
    pub hardening: HardeningConfig,
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Project name
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Android project directory, relative to the repo root
    #[serde(default = "default_android_dir")]
    pub android_dir: String,

    /// iOS project directory, relative to the repo root
    #[serde(default = "default_ios_dir")]
    pub ios_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            android_dir: default_android_dir(),
            ios_dir: default_ios_dir(),
        }
    }
}

fn default_project_name() -> String {
    "Stockly".to_string()
}

fn default_android_dir() -> String {
    "android".to_string()
}

fn default_ios_dir() -> String {
    "ios".to_string()
}

/// Build hardening configuration
///
/// Each platform key accepts a boolean, a table, or nothing at all.
/// Absent means enabled with default options; `false` is the only way to
/// suppress hardening for a platform.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HardeningConfig {
    /// Android obfuscation options, or a plain on/off switch
    #[serde(default)]
    pub android: PlatformToggle<AndroidHardening>,

    /// iOS optimization options, or a plain on/off switch.
    /// Accepted but currently a documented no-op; see `stockly-ios`.
    #[serde(default)]
    pub ios: PlatformToggle<IosHardening>,
}

/// A platform entry that is either a bare boolean switch or a full
/// options table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformToggle<T> {
    /// `android = false` / `android = true`
    Switch(bool),
    /// `[hardening.android]` with per-flag options
    Options(T),
}

impl<T: Default> Default for PlatformToggle<T> {
    fn default() -> Self {
        Self::Options(T::default())
    }
}

impl<T: Clone + Default> PlatformToggle<T> {
    /// Whether hardening runs at all for this platform
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Switch(enabled) => *enabled,
            Self::Options(_) => true,
        }
    }

    /// Resolved options: a bare `true` switch yields the defaults
    pub fn options(&self) -> T {
        match self {
            Self::Switch(_) => T::default(),
            Self::Options(options) => options.clone(),
        }
    }
}

/// Android obfuscation flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndroidHardening {
    /// Enable the R8 full-mode shrinking pass
    #[serde(default = "default_true")]
    pub enable_r8: bool,

    /// Enable the Proguard name-obfuscation pass
    #[serde(default = "default_true")]
    pub enable_proguard: bool,
}

impl Default for AndroidHardening {
    fn default() -> Self {
        Self {
            enable_r8: true,
            enable_proguard: true,
        }
    }
}

/// iOS optimization flags
///
/// Parsed and validated, but not acted on: the equivalent hardening is
/// configured manually in Xcode. Kept in the schema so a config that sets
/// it is not silently misspelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IosHardening {
    /// Reserved; has no effect in this version
    #[serde(default = "default_true")]
    pub enable_optimization: bool,
}

impl Default for IosHardening {
    fn default() -> Self {
        Self {
            enable_optimization: true,
        }
    }
}

fn default_true() -> bool {
    true
}
