//! Configuration and input validation
//!
//! Validation failures come in two strengths: errors, which stop a command,
//! and warnings, which are reported but do not fail the run. The warning
//! channel is also how non-fatal findings from the harden pass (e.g. a
//! descriptor that does not match the expected shape) reach the user
//! instead of being silently dropped.

use crate::config::{ConfigSchema, PlatformToggle};
use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

static PROJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9 _-]*$").expect("static regex"));

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
            });
        }
        self
    }

    /// Validate that a field is a plain relative path (no absolute paths,
    /// no parent traversal)
    pub fn relative_path(mut self, field: &str, value: &str) -> Self {
        if value.starts_with('/') || value.split('/').any(|part| part == "..") {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Must be a relative path inside the repository".to_string(),
                code: "RELATIVE_PATH".to_string(),
            });
        }
        self
    }

    /// Validate a project name against the allowed character set
    pub fn project_name(mut self, field: &str, value: &str) -> Self {
        if !value.is_empty() && !PROJECT_NAME_RE.is_match(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Must start with a letter and contain only letters, digits, spaces, '_' or '-'"
                    .to_string(),
                code: "PROJECT_NAME".to_string(),
            });
        }
        self
    }

    /// Add a warning directly
    pub fn warn(mut self, field: &str, message: &str, code: &str) -> Self {
        self.result.add_warning(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            code: code.to_string(),
        });
        self
    }

    /// Finish and return the accumulated result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Validate a loaded configuration schema
///
/// Errors cover malformed fields; warnings cover accepted-but-inert
/// settings such as the iOS optimization flag.
pub fn validate_config(schema: &ConfigSchema) -> ValidationResult {
    let mut validator = Validator::new()
        .required("general.project_name", &schema.general.project_name)
        .project_name("general.project_name", &schema.general.project_name)
        .required("general.android_dir", &schema.general.android_dir)
        .relative_path("general.android_dir", &schema.general.android_dir)
        .required("general.ios_dir", &schema.general.ios_dir)
        .relative_path("general.ios_dir", &schema.general.ios_dir);

    // Default options are indistinguishable from an absent key, so only a
    // non-default iOS setting triggers the no-op warning.
    if let PlatformToggle::Options(ios) = &schema.hardening.ios {
        if !ios.enable_optimization {
            validator = validator.warn(
                "hardening.ios",
                "iOS hardening options are accepted but have no effect; configure \
                 Release optimization manually in Xcode",
                "IOS_NOOP",
            );
        }
    }

    validator.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IosHardening;

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_config(&ConfigSchema::default());
        assert!(result.is_valid());
    }

    #[test]
    fn test_required_rejects_empty() {
        let result = Validator::new().required("name", "   ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_relative_path_rejects_traversal() {
        let result = Validator::new()
            .relative_path("dir", "../outside")
            .validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_relative_path_rejects_absolute() {
        let result = Validator::new().relative_path("dir", "/etc").validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_project_name_charset() {
        let ok = Validator::new().project_name("name", "Stockly QA-2").validate();
        assert!(ok.is_valid());

        let bad = Validator::new().project_name("name", "1stockly!").validate();
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_ios_options_emit_warning() {
        let mut schema = ConfigSchema::default();
        schema.hardening.ios = PlatformToggle::Options(IosHardening {
            enable_optimization: false,
        });

        let result = validate_config(&schema);
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].code, "IOS_NOOP");
    }

    #[test]
    fn test_to_result_carries_messages() {
        let result = Validator::new().required("general.android_dir", "").validate();
        let err = result.to_result().unwrap_err();
        assert!(err.message.contains("general.android_dir"));
    }
}
