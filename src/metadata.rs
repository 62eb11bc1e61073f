//! Tag metadata for file-backed nodes, read from a directory of markdown notes.
//!
//! Implements:
//! - Inline `#tags` from the note body
//! - `tags:` from YAML frontmatter (list or single string)
//! - Caching: parsed tags are kept per file and invalidated on mtime change

use crate::filter::tags::{extract_tags, normalize_tag};
use crate::filter::MetadataSource;
use serde::Deserialize;
use serde_yaml::Value;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// The only frontmatter key we care about.
#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    #[serde(default)]
    tags: Option<Value>,
}

/// Tags from the `tags:` value: a list of scalars, or one string where
/// "a, b" and "a b" both list two tags. Nested entries are skipped.
fn frontmatter_tags(value: Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.into_iter().filter_map(scalar_tag).collect(),
        Value::String(tags) => tags
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        other => scalar_tag(other).into_iter().collect(),
    }
}

fn scalar_tag(value: Value) -> Option<String> {
    let tag = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!tag.is_empty()).then_some(tag)
}

/// Split a note into its frontmatter block (if any) and body.
fn split_frontmatter(contents: &str) -> (Option<&str>, &str) {
    let Some(rest) = contents
        .strip_prefix("---\n")
        .or_else(|| contents.strip_prefix("---\r\n"))
    else {
        return (None, contents);
    };
    match rest.find("\n---") {
        Some(end) => {
            let body = &rest[end + 4..];
            let body = body.split_once('\n').map_or("", |(_, b)| b);
            (Some(&rest[..end]), body)
        }
        None => (None, contents),
    }
}

/// All tags of a note, each with a leading `#`, frontmatter first, without duplicates.
pub fn parse_note_tags(contents: &str) -> Vec<String> {
    let (frontmatter, body) = split_frontmatter(contents);
    let mut tags = Vec::new();

    if let Some(yaml) = frontmatter {
        match serde_yaml::from_str::<Frontmatter>(yaml) {
            Ok(fm) => {
                if let Some(value) = fm.tags {
                    tags.extend(frontmatter_tags(value).iter().map(|t| normalize_tag(t)));
                }
            }
            Err(e) => tracing::debug!("Ignoring unparsable frontmatter: {}", e),
        }
    }
    tags.extend(extract_tags(body).map(str::to_string));

    let mut seen = BTreeSet::new();
    tags.retain(|t| seen.insert(t.clone()));
    tags
}

/// Cached tags for one note
#[derive(Debug, Clone)]
struct CachedTags {
    mtime: Option<SystemTime>,
    tags: Vec<String>,
}

/// Metadata source backed by a vault directory.
pub struct VaultMetadata {
    root: PathBuf,
    cache: RefCell<HashMap<PathBuf, CachedTags>>,
}

impl VaultMetadata {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn mtime(path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
    }

    /// Tags for an absolute note path, re-reading only when the mtime changed.
    fn tags_at(&self, path: &Path) -> Vec<String> {
        let mtime = Self::mtime(path);
        if let Some(cached) = self.cache.borrow().get(path) {
            if cached.mtime.is_some() && cached.mtime == mtime {
                return cached.tags.clone();
            }
        }

        let tags = match std::fs::read_to_string(path) {
            Ok(contents) => parse_note_tags(&contents),
            Err(e) => {
                tracing::debug!("No tags for {:?}: {}", path, e);
                Vec::new()
            }
        };
        self.cache.borrow_mut().insert(
            path.to_path_buf(),
            CachedTags {
                mtime,
                tags: tags.clone(),
            },
        );
        tags
    }
}

impl MetadataSource for VaultMetadata {
    fn tags_for(&self, file: &str) -> Vec<String> {
        self.tags_at(&self.root.join(file))
    }

    fn all_tags(&self) -> Vec<String> {
        let mut all = BTreeSet::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        {
            all.extend(self.tags_at(entry.path()));
        }
        tracing::debug!("Found {} tags under {:?}", all.len(), self.root);
        all.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frontmatter_list_and_inline_tags() {
        let note = "---\ntitle: Plan\ntags:\n  - project\n  - \"#urgent\"\n---\n# Heading\nBody with #idea and #project\n";
        assert_eq!(parse_note_tags(note), vec!["#project", "#urgent", "#idea"]);
    }

    #[test]
    fn non_string_list_entries_keep_the_rest() {
        let note = "---\ntags: [project, 2024, true, {nested: x}]\n---\nbody";
        assert_eq!(parse_note_tags(note), vec!["#project", "#2024", "#true"]);
    }

    #[test]
    fn parses_single_string_tags() {
        let note = "---\ntags: alpha, beta gamma\n---\ntext";
        assert_eq!(parse_note_tags(note), vec!["#alpha", "#beta", "#gamma"]);
    }

    #[test]
    fn notes_without_frontmatter_use_body_only() {
        assert_eq!(parse_note_tags("just #one tag"), vec!["#one"]);
        assert!(parse_note_tags("").is_empty());
    }

    #[test]
    fn bad_frontmatter_is_ignored() {
        let note = "---\ntags: [unclosed\n---\nstill #here";
        assert_eq!(parse_note_tags(note), vec!["#here"]);
    }

    #[test]
    fn reads_tags_from_a_vault() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.md"), "---\ntags: [x]\n---\nhello").unwrap();
        std::fs::write(dir.path().join("sub/b.md"), "see #y").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "#nope").unwrap();

        let vault = VaultMetadata::new(dir.path());
        assert_eq!(vault.tags_for("a.md"), vec!["#x"]);
        assert_eq!(vault.tags_for("sub/b.md"), vec!["#y"]);
        assert!(vault.tags_for("missing.md").is_empty());
        assert_eq!(vault.all_tags(), vec!["#x", "#y"]);
    }
}
