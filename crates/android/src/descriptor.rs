//! Structured model of a Gradle build descriptor
//!
//! A descriptor is a tree of directives: each directive has a name, optional
//! argument tokens, and an optional brace-delimited block of child
//! directives (`android { buildTypes { release { ... } } }`).
//!
//! The tree is a read-only index over the original source: every directive
//! and block carries byte offsets back into it. Mutations are expressed as
//! [`Edit`] values (targeted splices) and applied in one pass, so untouched
//! bytes come through identical and inserted snippets always carry their
//! own balanced braces.

use crate::parser;
use std::ops::Range;

/// A parsed build descriptor together with its source text
#[derive(Debug, Clone)]
pub struct GradleDocument {
    source: String,
    root: Vec<Directive>,
}

/// A single directive: name, argument tokens, optional child block
#[derive(Debug, Clone)]
pub struct Directive {
    /// Directive name (e.g. `android`, `release`, `minifyEnabled`)
    pub name: String,
    /// Argument tokens following the name
    pub args: Vec<Arg>,
    /// Byte range of the directive's statement (name through last argument)
    pub span: Range<usize>,
    /// Optional `{ ... }` block
    pub block: Option<Block>,
}

/// A single argument token with its location in the source
#[derive(Debug, Clone)]
pub struct Arg {
    /// Raw token text, quotes included for string literals
    pub text: String,
    /// Byte range of the token
    pub span: Range<usize>,
}

/// A brace-delimited block of child directives
#[derive(Debug, Clone)]
pub struct Block {
    /// Child directives in source order
    pub directives: Vec<Directive>,
    /// Byte offset just past the opening `{`
    pub open: usize,
    /// Byte offset of the closing `}`
    pub close: usize,
}

impl Block {
    /// First child directive with the given name
    pub fn child(&self, name: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.name == name)
    }
}

impl Directive {
    /// Child lookup through this directive's block, if it has one
    pub fn child(&self, name: &str) -> Option<&Directive> {
        self.block.as_ref().and_then(|b| b.child(name))
    }
}

impl GradleDocument {
    /// Parse a descriptor from source text
    pub fn parse(source: &str) -> Result<Self, parser::ParseError> {
        let root = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// The original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level directives
    pub fn root(&self) -> &[Directive] {
        &self.root
    }

    /// First top-level directive with the given name that carries a block
    pub fn top_level_block(&self, name: &str) -> Option<&Directive> {
        self.root
            .iter()
            .find(|d| d.name == name && d.block.is_some())
    }

    /// Every directive with the given name, anywhere in the tree
    pub fn find_all_named(&self, name: &str) -> Vec<&Directive> {
        let mut found = Vec::new();
        collect_named(&self.root, name, &mut found);
        found
    }

    /// Indentation of the line containing the given byte offset
    pub fn indent_at(&self, offset: usize) -> String {
        let line_start = self.source[..offset]
            .rfind('\n')
            .map_or(0, |pos| pos + 1);
        self.source[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    /// Apply a set of edits, producing the modified source
    ///
    /// Edits must not overlap. They are applied back to front so earlier
    /// offsets stay valid throughout.
    pub fn apply_edits(&self, mut edits: Vec<Edit>) -> String {
        edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
        let mut output = self.source.clone();
        for edit in edits {
            output.replace_range(edit.range, &edit.text);
        }
        output
    }
}

fn collect_named<'a>(directives: &'a [Directive], name: &str, found: &mut Vec<&'a Directive>) {
    for directive in directives {
        if directive.name == name {
            found.push(directive);
        }
        if let Some(block) = &directive.block {
            collect_named(&block.directives, name, found);
        }
    }
}

/// A single source splice: replace `range` with `text`
///
/// An insertion is a replacement of an empty range.
#[derive(Debug, Clone)]
pub struct Edit {
    /// Byte range to replace
    pub range: Range<usize>,
    /// Replacement text
    pub text: String,
}

impl Edit {
    /// Insert `text` at `offset`
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: offset..offset,
            text: text.into(),
        }
    }

    /// Replace `range` with `text`
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apply plugin: 'com.android.application'

android {
    compileSdkVersion 34

    defaultConfig {
        applicationId "app.stockly.mobile"
        minSdkVersion 24
    }

    buildTypes {
        release {
            minifyEnabled false
        }
    }
}

dependencies {
    implementation 'androidx.core:core-ktx:1.12.0'
}
"#;

    #[test]
    fn test_top_level_blocks() {
        let doc = GradleDocument::parse(SAMPLE).unwrap();
        assert!(doc.top_level_block("android").is_some());
        assert!(doc.top_level_block("dependencies").is_some());
        assert!(doc.top_level_block("buildTypes").is_none());
    }

    #[test]
    fn test_nested_child_lookup() {
        let doc = GradleDocument::parse(SAMPLE).unwrap();
        let android = doc.top_level_block("android").unwrap();
        let release = android.child("buildTypes").unwrap().child("release").unwrap();
        let minify = release.child("minifyEnabled").unwrap();
        assert_eq!(minify.args[0].text, "false");
    }

    #[test]
    fn test_find_all_named() {
        let doc = GradleDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.find_all_named("minifyEnabled").len(), 1);
        assert_eq!(doc.find_all_named("missing").len(), 0);
    }

    #[test]
    fn test_indent_at() {
        let doc = GradleDocument::parse(SAMPLE).unwrap();
        let android = doc.top_level_block("android").unwrap();
        assert_eq!(doc.indent_at(android.span.start), "");

        let minify = doc.find_all_named("minifyEnabled")[0];
        assert_eq!(doc.indent_at(minify.span.start), "            ");
    }

    #[test]
    fn test_apply_edits_back_to_front() {
        let doc = GradleDocument::parse("a { x 1 }\nb { y 2 }\n").unwrap();
        let x = doc.find_all_named("x")[0].args[0].span.clone();
        let y = doc.find_all_named("y")[0].args[0].span.clone();

        let out = doc.apply_edits(vec![Edit::replace(x, "9"), Edit::replace(y, "8")]);
        assert_eq!(out, "a { x 9 }\nb { y 8 }\n");
    }

    #[test]
    fn test_untouched_bytes_are_preserved() {
        let doc = GradleDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.apply_edits(Vec::new()), SAMPLE);
    }
}
