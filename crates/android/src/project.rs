//! On-disk harness for the hardening pass
//!
//! Owns all file I/O around the pure patch: locate the module descriptor
//! and `gradle.properties`, run the patch, write back only what changed.
//! A missing or unparseable descriptor is reported as a warning on the
//! harden report, never silently skipped.

use crate::descriptor::GradleDocument;
use crate::patcher::{self, PatchBranch};
use crate::properties::PropertiesFile;
use std::fs;
use std::path::{Path, PathBuf};
use stockly_core::config::AndroidHardening;
use stockly_core::{Error, Result, ResultExt};

/// A located Android project directory
#[derive(Debug, Clone)]
pub struct AndroidProject {
    root: PathBuf,
}

/// Outcome of one hardening pass over a project
#[derive(Debug, Default)]
pub struct HardenReport {
    /// Which descriptor branch fired, if the descriptor was parseable
    pub branch: Option<PatchBranch>,
    /// Changes applied (or pending, in dry-run) to the build descriptor
    pub descriptor_changes: Vec<String>,
    /// Changes applied (or pending, in dry-run) to `gradle.properties`
    pub property_changes: Vec<String>,
    /// Non-fatal findings
    pub warnings: Vec<String>,
    /// Files written (empty in dry-run)
    pub modified_files: Vec<PathBuf>,
}

impl HardenReport {
    /// Whether the project already carried every hardening setting
    pub fn is_clean(&self) -> bool {
        self.descriptor_changes.is_empty() && self.property_changes.is_empty()
    }

    /// All changes, descriptor first
    pub fn changes(&self) -> impl Iterator<Item = &String> {
        self.descriptor_changes
            .iter()
            .chain(self.property_changes.iter())
    }
}

impl AndroidProject {
    /// Locate the Android project under a repository root
    pub fn locate(repo_root: &Path, android_dir: &str) -> Result<Self> {
        let root = repo_root.join(android_dir);
        if !root.is_dir() {
            return Err(Error::gradle(format!(
                "Android project directory not found: {}",
                root.display()
            ))
            .with_suggestion(
                "Set general.android_dir in .stockly-tools.toml to the Gradle project path",
            ));
        }
        Ok(Self { root })
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The module build descriptor: `app/build.gradle`, falling back to a
    /// root-level `build.gradle`
    pub fn build_gradle_path(&self) -> Result<PathBuf> {
        let candidates = [
            self.root.join("app").join("build.gradle"),
            self.root.join("build.gradle"),
        ];
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                Error::file_not_found(self.root.join("app").join("build.gradle"))
                    .with_context("Looking for the module build descriptor")
            })
    }

    /// Path of `gradle.properties`; the file may not exist yet
    pub fn gradle_properties_path(&self) -> PathBuf {
        self.root.join("gradle.properties")
    }

    /// Run the hardening pass
    ///
    /// With `dry_run` set, reports what would change without writing.
    pub fn harden(&self, options: &AndroidHardening, dry_run: bool) -> Result<HardenReport> {
        let mut report = HardenReport::default();

        let gradle_path = self.build_gradle_path()?;
        let source = fs::read_to_string(&gradle_path)
            .map_err(Error::from)
            .context(format!("Reading {}", gradle_path.display()))?;

        match GradleDocument::parse(&source) {
            Ok(doc) => {
                let patch = patcher::patch_build_gradle(&doc);
                report.branch = Some(patch.branch);
                let changed = patch.changed();
                report.warnings.extend(patch.warnings);
                if changed {
                    if !dry_run {
                        fs::write(&gradle_path, &patch.source)
                            .map_err(Error::from)
                            .context(format!("Writing {}", gradle_path.display()))?;
                        report.modified_files.push(gradle_path.clone());
                    }
                    report.descriptor_changes = patch.changes;
                }
            }
            Err(err) => {
                report.warnings.push(format!(
                    "{} could not be parsed and was left unchanged: {}",
                    gradle_path.display(),
                    err
                ));
            }
        }

        let props_path = self.gradle_properties_path();
        let content = if props_path.is_file() {
            fs::read_to_string(&props_path)
                .map_err(Error::from)
                .context(format!("Reading {}", props_path.display()))?
        } else {
            String::new()
        };

        let mut props = PropertiesFile::parse(&content);
        let property_changes = patcher::patch_properties(&mut props, options);
        if !property_changes.is_empty() {
            if !dry_run {
                fs::write(&props_path, props.to_content())
                    .map_err(Error::from)
                    .context(format!("Writing {}", props_path.display()))?;
                report.modified_files.push(props_path);
            }
            report.property_changes = property_changes;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with(build_gradle: &str) -> (tempfile::TempDir, AndroidProject) {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("android").join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("build.gradle"), build_gradle).unwrap();
        let project = AndroidProject::locate(dir.path(), "android").unwrap();
        (dir, project)
    }

    #[test]
    fn test_locate_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = AndroidProject::locate(dir.path(), "android").unwrap_err();
        assert!(err.message.contains("not found"));
    }

    #[test]
    fn test_prefers_app_module_descriptor() {
        let (_dir, project) = project_with("android { }\n");
        let path = project.build_gradle_path().unwrap();
        assert!(path.ends_with("app/build.gradle"));
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let (_dir, project) = project_with("android { }\n");
        let report = project
            .harden(&AndroidHardening::default(), true)
            .unwrap();

        assert!(!report.is_clean());
        assert!(report.modified_files.is_empty());

        let untouched =
            fs::read_to_string(project.build_gradle_path().unwrap()).unwrap();
        assert_eq!(untouched, "android { }\n");
        assert!(!project.gradle_properties_path().exists());
    }

    #[test]
    fn test_harden_writes_both_files() {
        let (_dir, project) = project_with("android { }\n");
        let report = project
            .harden(&AndroidHardening::default(), false)
            .unwrap();

        assert_eq!(report.branch, Some(PatchBranch::CreatedBuildTypes));
        assert_eq!(report.modified_files.len(), 2);

        let gradle = fs::read_to_string(project.build_gradle_path().unwrap()).unwrap();
        assert!(gradle.contains("minifyEnabled true"));

        let props = fs::read_to_string(project.gradle_properties_path()).unwrap();
        assert!(props.contains("android.enableR8.fullMode=true"));
        assert!(props.contains("android.enableProguard=true"));
    }

    #[test]
    fn test_unparseable_descriptor_warns_and_leaves_file() {
        let broken = "android {\n    buildTypes {\n";
        let (_dir, project) = project_with(broken);
        let report = project
            .harden(&AndroidHardening::default(), false)
            .unwrap();

        assert!(report.branch.is_none());
        assert!(report.descriptor_changes.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("left unchanged"));

        let untouched =
            fs::read_to_string(project.build_gradle_path().unwrap()).unwrap();
        assert_eq!(untouched, broken);
    }
}
