//! Per-platform dispatch of the hardening pass
//!
//! Gating lives here and nowhere else: a platform runs unless its toggle
//! is explicitly `false` (an absent key means enabled with defaults, as
//! materialized by the config schema). Android dispatches to the Gradle
//! patch; iOS resolves to its manual-configuration status.

use std::path::Path;
use stockly_android::{patch_build_gradle, AndroidProject, GradleDocument, HardenReport, PatchReport};
use stockly_core::config::HardeningConfig;
use stockly_core::Result;
use stockly_ios::{hardening_support, HardeningSupport};

/// Outcome of dispatching one platform
#[derive(Debug)]
pub enum PlatformOutcome {
    /// The hardening pass ran over the project on disk
    Applied(HardenReport),
    /// The platform toggle is explicitly off
    Disabled,
    /// The platform requires manual configuration
    Manual(HardeningSupport),
}

/// Applies each platform's hardening according to the loaded configuration
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: HardeningConfig,
}

impl Dispatcher {
    /// Build a dispatcher from the hardening section of the config
    pub fn new(config: HardeningConfig) -> Self {
        Self { config }
    }

    /// Run (or dry-run) the Android pass over the project on disk
    pub fn apply_android(
        &self,
        repo_root: &Path,
        android_dir: &str,
        dry_run: bool,
    ) -> Result<PlatformOutcome> {
        if !self.config.android.is_enabled() {
            return Ok(PlatformOutcome::Disabled);
        }
        let project = AndroidProject::locate(repo_root, android_dir)?;
        let report = project.harden(&self.config.android.options(), dry_run)?;
        Ok(PlatformOutcome::Applied(report))
    }

    /// Patch a single in-memory descriptor, without touching disk
    ///
    /// Returns `None` when the Android toggle is off.
    pub fn apply_to_descriptor(&self, doc: &GradleDocument) -> Option<PatchReport> {
        if !self.config.android.is_enabled() {
            return None;
        }
        Some(patch_build_gradle(doc))
    }

    /// Resolve the iOS pass
    pub fn apply_ios(&self) -> PlatformOutcome {
        if !self.config.ios.is_enabled() {
            return PlatformOutcome::Disabled;
        }
        PlatformOutcome::Manual(hardening_support(&self.config.ios.options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockly_core::config::ConfigSchema;

    fn dispatcher_from(toml: &str) -> Dispatcher {
        let schema: ConfigSchema = ::toml::from_str(toml).unwrap();
        Dispatcher::new(schema.hardening)
    }

    #[test]
    fn test_absent_platform_keys_mean_enabled() {
        let dispatcher = dispatcher_from("");
        let doc = GradleDocument::parse("android { }\n").unwrap();
        let report = dispatcher.apply_to_descriptor(&doc).unwrap();
        assert!(report.source.contains("minifyEnabled true"));
    }

    #[test]
    fn test_explicit_false_disables_android() {
        let dispatcher = dispatcher_from("[hardening]\nandroid = false\n");
        let doc = GradleDocument::parse("android { }\n").unwrap();
        assert!(dispatcher.apply_to_descriptor(&doc).is_none());
    }

    #[test]
    fn test_options_table_counts_as_enabled() {
        let dispatcher = dispatcher_from("[hardening.android]\nenable_r8 = false\n");
        let doc = GradleDocument::parse("android { }\n").unwrap();
        assert!(dispatcher.apply_to_descriptor(&doc).is_some());
    }

    #[test]
    fn test_ios_resolves_to_manual() {
        let dispatcher = dispatcher_from("");
        assert!(matches!(
            dispatcher.apply_ios(),
            PlatformOutcome::Manual(HardeningSupport::Manual { .. })
        ));
    }

    #[test]
    fn test_ios_explicit_false_disables() {
        let dispatcher = dispatcher_from("[hardening]\nios = false\n");
        assert!(matches!(dispatcher.apply_ios(), PlatformOutcome::Disabled));
    }

    #[test]
    fn test_disabled_android_touches_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("android").join("app");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("build.gradle"), "android { }\n").unwrap();

        let dispatcher = dispatcher_from("[hardening]\nandroid = false\n");
        let outcome = dispatcher
            .apply_android(dir.path(), "android", false)
            .unwrap();
        assert!(matches!(outcome, PlatformOutcome::Disabled));

        let untouched = std::fs::read_to_string(app.join("build.gradle")).unwrap();
        assert_eq!(untouched, "android { }\n");
    }
}
