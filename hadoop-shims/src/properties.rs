//! Reader for `config.properties` files.
//!
//! A small subset of the classic properties format: one `key=value` pair per
//! line, `#` or `!` comment lines, duplicate keys last-wins. Keys are trimmed
//! on both sides; values lose their leading whitespace but keep trailing
//! whitespace, which matters for classpath entries ending in spaces.

use std::collections::HashMap;

use crate::vfs::{VfsError, VfsFile};

/// An in-memory string-to-string property map.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties from text. Malformed lines cannot occur: a line
    /// without a separator is a key with an empty value.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let stripped = line.trim_start();
            if stripped.is_empty() || stripped.starts_with('#') || stripped.starts_with('!') {
                continue;
            }
            match stripped.split_once('=') {
                Some((key, value)) => {
                    entries.insert(key.trim().to_string(), value.trim_start().to_string());
                }
                None => {
                    entries.insert(stripped.trim_end().to_string(), String::new());
                }
            }
        }
        Self { entries }
    }

    /// Load and parse a properties file through the virtual path layer.
    pub fn load(file: &dyn VfsFile) -> Result<Self, VfsError> {
        let bytes = file.read()?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Look up a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a property value, falling back to `default`.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_pairs() {
        let props = Properties::parse("name=CDH 5\nclasspath=./lib,./extra\n");
        assert_eq!(props.get("name"), Some("CDH 5"));
        assert_eq!(props.get("classpath"), Some("./lib,./extra"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_parse_comments_and_blanks() {
        let props = Properties::parse("# a comment\n! another\n\n  \nname=x\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("name"), Some("x"));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let props = Properties::parse("name=first\nname=second\n");
        assert_eq!(props.get("name"), Some("second"));
    }

    #[test]
    fn test_whitespace_handling() {
        let props = Properties::parse("  name  =  CDH 5  \n");
        // Key fully trimmed; value keeps trailing whitespace only.
        assert_eq!(props.get("name"), Some("CDH 5  "));
    }

    #[test]
    fn test_key_without_separator() {
        let props = Properties::parse("standalone\n");
        assert_eq!(props.get("standalone"), Some(""));
    }

    #[test]
    fn test_crlf_lines() {
        let props = Properties::parse("name=win\r\nother=x\r\n");
        assert_eq!(props.get("name"), Some("win"));
        assert_eq!(props.get("other"), Some("x"));
    }

    #[test]
    fn test_get_or_default() {
        let props = Properties::parse("name=x\n");
        assert_eq!(props.get_or("name", "fallback"), "x");
        assert_eq!(props.get_or("missing", "fallback"), "fallback");
    }

    #[test]
    fn test_load_through_vfs() {
        use crate::vfs::LocalFile;
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.properties");
        std::fs::write(&path, "name=From Disk\n").unwrap();

        let props = Properties::load(&LocalFile::new(path)).unwrap();
        assert_eq!(props.get("name"), Some("From Disk"));
    }
}
