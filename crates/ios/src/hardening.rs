//! iOS build hardening status
//!
//! There is no automated hardening pass for iOS: the equivalent settings
//! (Release optimization level, symbol stripping, dead code stripping)
//! live in the Xcode project and build settings, outside this tool's
//! reach. The option is still part of the configuration schema so a
//! config that sets it is acknowledged out loud instead of being silently
//! swallowed.

use serde::{Deserialize, Serialize};
use stockly_core::config::IosHardening;

/// Whether a platform's hardening pass can run automatically
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "support")]
pub enum HardeningSupport {
    /// The pass runs and edits build configuration on disk
    Automated,
    /// The pass is configured by hand; `steps` describe where
    Manual {
        /// Why automation is unavailable
        reason: String,
        /// Manual configuration steps
        steps: Vec<String>,
    },
}

/// Hardening support for the iOS platform
///
/// Always [`HardeningSupport::Manual`] in this version. The
/// `enable_optimization` flag is accepted and has no effect.
pub fn hardening_support(_options: &IosHardening) -> HardeningSupport {
    HardeningSupport::Manual {
        reason: "iOS release hardening is controlled by Xcode build settings that this tool \
                 does not edit"
            .to_string(),
        steps: manual_steps().iter().map(|s| s.to_string()).collect(),
    }
}

/// The manual Xcode configuration equivalent to the Android pass
pub fn manual_steps() -> &'static [&'static str] {
    &[
        "Set SWIFT_OPTIMIZATION_LEVEL to -O for the Release configuration",
        "Set STRIP_INSTALLED_PRODUCT (Strip Linked Product) to YES",
        "Set DEAD_CODE_STRIPPING to YES",
        "Set DEPLOYMENT_POSTPROCESSING to YES for App Store builds",
    ]
}
