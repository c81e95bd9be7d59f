//! Release-build obfuscation patch for Android descriptors
//!
//! Two independent settings layers get patched:
//!
//! - `build.gradle`: ensure the release build type carries
//!   `minifyEnabled true`, `shrinkResources true` and the standard
//!   `proguardFiles` pair, creating the enclosing `buildTypes`/`release`
//!   blocks when missing.
//! - `gradle.properties`: ensure the R8 full-mode and Proguard switches
//!   are set, one per configured flag.
//!
//! Exactly one descriptor branch fires per invocation, in fixed
//! precedence: missing `buildTypes`, then missing `release`, then an
//! existing `minifyEnabled` flag anywhere in the document (rewritten in
//! place), then a `release` block without the flag. Re-running the patch
//! is a no-op in every case: the insertion branches only fire while their
//! target is missing, after which the rewrite branch takes over.
//!
//! The patch itself never fails and performs no I/O. A descriptor that
//! does not match the expected shape (no `android` root block) comes back
//! unchanged with an explicit warning in the report.

use crate::descriptor::{Block, Directive, Edit, GradleDocument};
use crate::properties::PropertiesFile;
use serde::Serialize;
use stockly_core::config::AndroidHardening;

/// `gradle.properties` switch for the R8 full-mode shrinking pass
pub const PROP_R8_FULL_MODE: &str = "android.enableR8.fullMode";
/// `gradle.properties` switch for the Proguard pass
pub const PROP_PROGUARD_ENABLED: &str = "android.enableProguard";

/// Platform-supplied default rules file
pub const DEFAULT_PROGUARD_FILE: &str = "proguard-android.txt";
/// Project-local rules file
pub const PROJECT_PROGUARD_FILE: &str = "proguard-rules.pro";

/// Which descriptor branch fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchBranch {
    /// No `buildTypes` block existed; a full block was appended
    CreatedBuildTypes,
    /// `buildTypes` existed without a `release` block; one was inserted
    CreatedReleaseBlock,
    /// `minifyEnabled` flags existed and were rewritten to `true`
    RewroteMinifyFlags,
    /// `release` existed without a minify flag; directives were inserted
    InsertedReleaseDirectives,
    /// The descriptor did not match the expected shape
    Unchanged,
}

/// Result of one descriptor patch pass
#[derive(Debug, Clone)]
pub struct PatchReport {
    /// Patched descriptor source
    pub source: String,
    /// Which branch fired
    pub branch: PatchBranch,
    /// Human-readable list of applied changes; empty when the descriptor
    /// was already hardened
    pub changes: Vec<String>,
    /// Non-fatal findings (e.g. missing `android` block)
    pub warnings: Vec<String>,
}

impl PatchReport {
    /// Whether the pass changed the descriptor
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    fn unchanged(doc: &GradleDocument, warnings: Vec<String>) -> Self {
        Self {
            source: doc.source().to_string(),
            branch: PatchBranch::Unchanged,
            changes: Vec::new(),
            warnings,
        }
    }
}

/// Patch a parsed `build.gradle` so release builds obfuscate and shrink
pub fn patch_build_gradle(doc: &GradleDocument) -> PatchReport {
    let Some(android) = doc.top_level_block("android") else {
        return PatchReport::unchanged(
            doc,
            vec![
                "No 'android' block found in the build descriptor; nothing was changed"
                    .to_string(),
            ],
        );
    };
    // top_level_block only returns directives that carry a block
    let android_block = android.block.as_ref().expect("block checked above");
    let android_indent = doc.indent_at(android.span.start);

    match child_block(android, "buildTypes") {
        None => create_build_types(doc, android_block, &android_indent),
        Some(build_types) => match child_block(build_types, "release") {
            None => create_release_block(doc, build_types),
            Some(release) => {
                let minify_flags = doc.find_all_named("minifyEnabled");
                if minify_flags.is_empty() {
                    insert_release_directives(doc, release)
                } else {
                    rewrite_minify_flags(doc, &minify_flags)
                }
            }
        },
    }
}

/// Patch `gradle.properties` per the configured flags
///
/// Upserts each switch: an existing key is overwritten in place, a missing
/// one appended. Returns the applied changes.
pub fn patch_properties(props: &mut PropertiesFile, options: &AndroidHardening) -> Vec<String> {
    let mut changes = Vec::new();

    if options.enable_r8 && props.set(PROP_R8_FULL_MODE, "true") {
        changes.push(format!("Set {}=true", PROP_R8_FULL_MODE));
    }
    if options.enable_proguard && props.set(PROP_PROGUARD_ENABLED, "true") {
        changes.push(format!("Set {}=true", PROP_PROGUARD_ENABLED));
    }

    changes
}

fn child_block<'a>(parent: &'a Directive, name: &str) -> Option<&'a Directive> {
    parent
        .block
        .as_ref()?
        .directives
        .iter()
        .find(|d| d.name == name && d.block.is_some())
}

/// The three hardening directives, one per line at the given indent
fn release_directives_body(indent: &str) -> String {
    format!(
        "{indent}minifyEnabled true\n\
         {indent}shrinkResources true\n\
         {indent}proguardFiles getDefaultProguardFile('{DEFAULT_PROGUARD_FILE}'), '{PROJECT_PROGUARD_FILE}'\n"
    )
}

fn create_build_types(doc: &GradleDocument, android_block: &Block, indent: &str) -> PatchReport {
    let one = format!("{indent}    ");
    let two = format!("{indent}        ");
    let three = format!("{indent}            ");
    let body = format!(
        "{one}buildTypes {{\n{two}release {{\n{}{two}}}\n{one}}}\n",
        release_directives_body(&three)
    );

    let edit = insert_before_close(doc, android_block.close, &body, indent);
    PatchReport {
        source: doc.apply_edits(vec![edit]),
        branch: PatchBranch::CreatedBuildTypes,
        changes: vec!["Added buildTypes.release block with obfuscation directives".to_string()],
        warnings: Vec::new(),
    }
}

fn create_release_block(doc: &GradleDocument, build_types: &Directive) -> PatchReport {
    let outer = doc.indent_at(build_types.span.start);
    let one = format!("{outer}    ");
    let two = format!("{outer}        ");
    let body = format!(
        "{one}release {{\n{}{one}}}\n",
        release_directives_body(&two)
    );

    let block = build_types.block.as_ref().expect("checked by caller");
    let edit = insert_after_open(doc, block, &body, &outer);
    PatchReport {
        source: doc.apply_edits(vec![edit]),
        branch: PatchBranch::CreatedReleaseBlock,
        changes: vec!["Added release block with obfuscation directives".to_string()],
        warnings: Vec::new(),
    }
}

fn insert_release_directives(doc: &GradleDocument, release: &Directive) -> PatchReport {
    let outer = doc.indent_at(release.span.start);
    let body = release_directives_body(&format!("{outer}    "));

    let block = release.block.as_ref().expect("checked by caller");
    let edit = insert_after_open(doc, block, &body, &outer);
    PatchReport {
        source: doc.apply_edits(vec![edit]),
        branch: PatchBranch::InsertedReleaseDirectives,
        changes: vec!["Added obfuscation directives to the release block".to_string()],
        warnings: Vec::new(),
    }
}

fn rewrite_minify_flags(doc: &GradleDocument, flags: &[&Directive]) -> PatchReport {
    let mut edits = Vec::new();
    let mut changes = Vec::new();

    for flag in flags {
        match flag.args.iter().rev().find(|a| a.text != "=") {
            Some(value) if value.text != "true" => {
                changes.push(format!("Set minifyEnabled true (was {})", value.text));
                edits.push(Edit::replace(value.span.clone(), "true"));
            }
            Some(_) => {}
            None => {
                changes.push("Set minifyEnabled true (had no value)".to_string());
                edits.push(Edit::insert(flag.span.end, " true"));
            }
        }
    }

    PatchReport {
        source: doc.apply_edits(edits),
        branch: PatchBranch::RewroteMinifyFlags,
        changes,
        warnings: Vec::new(),
    }
}

/// Insert full lines just before a block's closing brace
fn insert_before_close(doc: &GradleDocument, close: usize, body: &str, outer_indent: &str) -> Edit {
    let source = doc.source();
    let line_start = source[..close].rfind('\n').map_or(0, |p| p + 1);
    if source[line_start..close].trim().is_empty() {
        // the brace sits on its own line; slot the body in above it
        Edit::insert(line_start, body.to_string())
    } else {
        // inline block like `android { }`
        Edit::insert(close, format!("\n{body}{outer_indent}"))
    }
}

/// Insert full lines just after a block's opening brace
fn insert_after_open(doc: &GradleDocument, block: &Block, body: &str, outer_indent: &str) -> Edit {
    let between = &doc.source()[block.open..block.close];
    if between.contains('\n') {
        Edit::insert(
            block.open,
            format!("\n{}", body.trim_end_matches('\n')),
        )
    } else {
        // inline block; rewrite the whole interior
        Edit::replace(block.open..block.close, format!("\n{body}{outer_indent}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(source: &str) -> PatchReport {
        let doc = GradleDocument::parse(source).unwrap();
        patch_build_gradle(&doc)
    }

    fn assert_still_parses(source: &str) {
        let doc = GradleDocument::parse(source);
        assert!(doc.is_ok(), "patched source no longer parses:\n{source}");
    }

    #[test]
    fn test_bare_android_block_gets_full_build_types() {
        let report = patch("android { }\n");
        assert_eq!(report.branch, PatchBranch::CreatedBuildTypes);
        assert!(report.changed());

        let out = &report.source;
        assert_eq!(out.matches("android {").count(), 1);
        assert_eq!(out.matches("buildTypes {").count(), 1);
        assert_eq!(out.matches("release {").count(), 1);
        assert!(out.contains("minifyEnabled true"));
        assert!(out.contains("shrinkResources true"));
        assert!(out.contains(
            "proguardFiles getDefaultProguardFile('proguard-android.txt'), 'proguard-rules.pro'"
        ));
        assert_still_parses(out);
    }

    #[test]
    fn test_build_types_without_release_gains_release_block() {
        let source = "\
android {
    compileSdkVersion 34

    buildTypes {
        debug {
            debuggable true
        }
    }
}
";
        let report = patch(source);
        assert_eq!(report.branch, PatchBranch::CreatedReleaseBlock);

        let out = &report.source;
        assert!(out.contains("release {"));
        assert!(out.contains("minifyEnabled true"));
        // existing content is untouched
        assert!(out.contains("        debug {\n            debuggable true\n        }"));
        assert!(out.contains("compileSdkVersion 34"));
        assert_still_parses(out);
    }

    #[test]
    fn test_insertion_leaves_other_bytes_identical() {
        let source = "\
android {
    buildTypes {
        debug {
            debuggable true
        }
    }
}
";
        let report = patch(source);
        // the insert is a pure splice after the buildTypes brace: every
        // byte before and after the insertion point is unchanged
        let open = source.find("buildTypes {").unwrap() + "buildTypes {".len();
        assert!(report.source.starts_with(&source[..open]));
        assert!(report.source.ends_with(&source[open..]));
        assert!(report.source.len() > source.len());
    }

    #[test]
    fn test_existing_minify_flag_rewritten_not_duplicated() {
        let source = "\
android {
    buildTypes {
        release {
            minifyEnabled false
        }
    }
}
";
        let report = patch(source);
        assert_eq!(report.branch, PatchBranch::RewroteMinifyFlags);

        let out = &report.source;
        assert_eq!(out.matches("minifyEnabled").count(), 1);
        assert!(out.contains("minifyEnabled true"));
        assert!(!out.contains("minifyEnabled false"));
        assert_still_parses(out);
    }

    #[test]
    fn test_every_minify_occurrence_rewritten() {
        let source = "\
android {
    buildTypes {
        debug {
            minifyEnabled false
        }
        release {
            minifyEnabled false
        }
    }
}
";
        let report = patch(source);
        assert_eq!(report.source.matches("minifyEnabled true").count(), 2);
        assert_eq!(report.changes.len(), 2);
    }

    #[test]
    fn test_release_without_minify_gets_directives() {
        let source = "\
android {
    buildTypes {
        release {
            signingConfig signingConfigs.release
        }
    }
}
";
        let report = patch(source);
        assert_eq!(report.branch, PatchBranch::InsertedReleaseDirectives);

        let out = &report.source;
        assert!(out.contains("minifyEnabled true"));
        assert!(out.contains("signingConfig signingConfigs.release"));
        assert_still_parses(out);
    }

    #[test]
    fn test_no_android_block_is_reported_not_silent() {
        let report = patch("dependencies { }\n");
        assert_eq!(report.branch, PatchBranch::Unchanged);
        assert!(!report.changed());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.source, "dependencies { }\n");
    }

    #[test]
    fn test_patch_is_idempotent_from_every_starting_shape() {
        for source in [
            "android { }\n",
            "android {\n    buildTypes {\n    }\n}\n",
            "android {\n    buildTypes {\n        release {\n        }\n    }\n}\n",
            "android {\n    buildTypes {\n        release {\n            minifyEnabled false\n        }\n    }\n}\n",
        ] {
            let once = patch(source);
            let twice = patch(&once.source);
            assert_eq!(once.source, twice.source, "not idempotent for:\n{source}");
            assert!(!twice.changed(), "second run reported changes for:\n{source}");
        }
    }

    #[test]
    fn test_already_hardened_descriptor_reports_no_changes() {
        let source = "\
android {
    buildTypes {
        release {
            minifyEnabled true
        }
    }
}
";
        let report = patch(source);
        assert_eq!(report.branch, PatchBranch::RewroteMinifyFlags);
        assert!(!report.changed());
        assert_eq!(report.source, source);
    }

    #[test]
    fn test_properties_default_options_set_both_switches() {
        let mut props = PropertiesFile::parse("");
        let changes = patch_properties(&mut props, &AndroidHardening::default());
        assert_eq!(changes.len(), 2);
        assert_eq!(props.get(PROP_R8_FULL_MODE), Some("true"));
        assert_eq!(props.get(PROP_PROGUARD_ENABLED), Some("true"));
    }

    #[test]
    fn test_properties_disabled_options_set_nothing() {
        let mut props = PropertiesFile::parse("");
        let options = AndroidHardening {
            enable_r8: false,
            enable_proguard: false,
        };
        let changes = patch_properties(&mut props, &options);
        assert!(changes.is_empty());
        assert_eq!(props.entries().count(), 0);
    }

    #[test]
    fn test_properties_upsert_never_duplicates() {
        let mut props = PropertiesFile::parse("android.enableR8.fullMode=false\n");
        let changes = patch_properties(&mut props, &AndroidHardening::default());
        assert_eq!(changes.len(), 2);
        assert_eq!(props.get(PROP_R8_FULL_MODE), Some("true"));
        assert_eq!(
            props
                .entries()
                .filter(|e| e.key == PROP_R8_FULL_MODE)
                .count(),
            1
        );

        // second pass is a no-op
        assert!(patch_properties(&mut props, &AndroidHardening::default()).is_empty());
    }
}
