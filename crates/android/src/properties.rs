//! Ordered model of a `gradle.properties` file
//!
//! Comments, blank lines, entry order and untouched lines are preserved
//! byte for byte. Writes go through [`PropertiesFile::set`], which
//! overwrites an existing key in place and appends otherwise, so repeated
//! hardening passes never accumulate duplicate entries.

/// A single `key=value` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    /// Property key
    pub key: String,
    /// Property value
    pub value: String,
}

#[derive(Debug, Clone)]
enum Line {
    Entry {
        entry: PropertyEntry,
        /// Original line text; cleared when the entry is rewritten
        raw: Option<String>,
    },
    /// Comment, blank or unparseable line, kept verbatim
    Raw(String),
}

/// Parsed `gradle.properties` content
#[derive(Debug, Clone, Default)]
pub struct PropertiesFile {
    lines: Vec<Line>,
}

impl PropertiesFile {
    /// Parse properties content, preserving comments and blanks
    pub fn parse(content: &str) -> Self {
        let lines = content
            .lines()
            .map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    return Line::Raw(line.to_string());
                }
                match line.split_once('=') {
                    Some((key, value)) => Line::Entry {
                        entry: PropertyEntry {
                            key: key.trim().to_string(),
                            value: value.trim().to_string(),
                        },
                        raw: Some(line.to_string()),
                    },
                    None => Line::Raw(line.to_string()),
                }
            })
            .collect();
        Self { lines }
    }

    /// Value of the first entry with the given key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Entry { entry, .. } if entry.key == key => Some(entry.value.as_str()),
            _ => None,
        })
    }

    /// Set a key, overwriting every existing entry for it in place or
    /// appending a new entry at the end
    ///
    /// Returns `true` if the file content changed.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let mut found = false;
        let mut changed = false;

        for line in &mut self.lines {
            if let Line::Entry { entry, raw } = line {
                if entry.key == key {
                    found = true;
                    if entry.value != value {
                        entry.value = value.to_string();
                        *raw = None;
                        changed = true;
                    }
                }
            }
        }

        if !found {
            self.lines.push(Line::Entry {
                entry: PropertyEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                },
                raw: None,
            });
            changed = true;
        }

        changed
    }

    /// All entries in file order
    pub fn entries(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry { entry, .. } => Some(entry),
            Line::Raw(_) => None,
        })
    }

    /// Serialize back to file content
    pub fn to_content(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Entry {
                    raw: Some(raw), ..
                } => out.push_str(raw),
                Line::Entry { entry, raw: None } => {
                    out.push_str(&entry.key);
                    out.push('=');
                    out.push_str(&entry.value);
                }
                Line::Raw(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out
    }
}
