//! Tag discovery and tag-based node matching.

use crate::canvas::{CanvasData, Node, NodeKind};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Source of tags for file-backed nodes.
///
/// Tags are reported with their leading `#`.
pub trait MetadataSource {
    /// Tags attached to the file at `file` (vault-relative)
    fn tags_for(&self, file: &str) -> Vec<String>;

    /// Every tag known to the vault
    fn all_tags(&self) -> Vec<String>;
}

/// Metadata source that knows no tags; text nodes still match.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn tags_for(&self, _file: &str) -> Vec<String> {
        Vec::new()
    }

    fn all_tags(&self) -> Vec<String> {
        Vec::new()
    }
}

/// How a chosen tag selects nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Nodes carrying the tag
    Include,
    /// Nodes not carrying the tag
    Exclude,
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"#[\w/\-]+").expect("tag pattern is valid"))
}

/// `#token` substrings in free text, in order of appearance. Tokens made only
/// of digits (`#123`) are not tags.
pub fn extract_tags(text: &str) -> impl Iterator<Item = &str> {
    tag_regex()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|tag| !tag[1..].chars().all(|c| c.is_ascii_digit()))
}

/// Add a leading `#` if missing
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with('#') {
        tag.to_string()
    } else {
        format!("#{}", tag)
    }
}

/// Candidate tags for the picker: the global tags plus every `#token` in text
/// nodes. Sorted, without duplicates.
pub fn tag_universe(canvas: &CanvasData, metadata: &dyn MetadataSource) -> Vec<String> {
    let mut tags: BTreeSet<String> = metadata.all_tags().iter().map(|t| normalize_tag(t)).collect();
    for node in &canvas.nodes {
        if let NodeKind::Text { text } = &node.kind {
            tags.extend(extract_tags(text).map(str::to_string));
        }
    }
    tags.into_iter().collect()
}

/// Whether `node` is selected by `tag` under `rule`.
///
/// File nodes are judged by their metadata tags, text nodes by whether the
/// tag appears as a whole `#token` in the text. Links and groups never match.
pub fn node_matches(node: &Node, tag: &str, rule: TagMatch, metadata: &dyn MetadataSource) -> bool {
    let has_tag = match &node.kind {
        NodeKind::File { file, .. } => metadata
            .tags_for(file)
            .iter()
            .any(|t| normalize_tag(t) == tag),
        NodeKind::Text { text } => extract_tags(text).any(|t| t == tag),
        NodeKind::Link { .. } | NodeKind::Group { .. } => return false,
    };
    match rule {
        TagMatch::Include => has_tag,
        TagMatch::Exclude => !has_tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Region;
    use std::collections::HashMap;

    struct FixedTags(HashMap<&'static str, Vec<&'static str>>);

    impl MetadataSource for FixedTags {
        fn tags_for(&self, file: &str) -> Vec<String> {
            self.0
                .get(file)
                .map(|tags| tags.iter().map(|t| t.to_string()).collect())
                .unwrap_or_default()
        }

        fn all_tags(&self) -> Vec<String> {
            self.0.values().flatten().map(|t| t.to_string()).collect()
        }
    }

    fn metadata() -> FixedTags {
        FixedTags(HashMap::from([
            ("a.md", vec!["#x"]),
            ("multi.md", vec!["#x", "project"]),
            ("none.md", vec![]),
        ]))
    }

    #[test]
    fn extracts_hash_tokens() {
        let tags: Vec<_> = extract_tags("hello #y and #nested/tag, # heading #a-b").collect();
        assert_eq!(tags, vec!["#y", "#nested/tag", "#a-b"]);
    }

    #[test]
    fn numeric_tokens_are_not_tags() {
        let tags: Vec<_> = extract_tags("issue #123 fixed in #v2 on #2024-05").collect();
        assert_eq!(tags, vec!["#v2", "#2024-05"]);
    }

    #[test]
    fn text_match_needs_the_whole_token() {
        let meta = metadata();
        let r = Region::default();
        let node = Node::text("t", r, "see #xylophone and #x/sub");
        assert!(!node_matches(&node, "#x", TagMatch::Include, &meta));
        assert!(node_matches(&node, "#x", TagMatch::Exclude, &meta));
        assert!(node_matches(&node, "#xylophone", TagMatch::Include, &meta));
    }

    #[test]
    fn universe_merges_global_and_text_tags() {
        let canvas = CanvasData::new(
            vec![
                Node::text("t", Region::default(), "hello #y #x"),
                Node::link("l", Region::default(), "https://example.com/#anchor"),
            ],
            vec![],
        );
        let universe = tag_universe(&canvas, &metadata());
        assert_eq!(universe, vec!["#project", "#x", "#y"]);
    }

    #[test]
    fn include_matches_files_by_metadata_and_text_by_content() {
        let meta = metadata();
        let r = Region::default();
        assert!(node_matches(&Node::file("f", r, "a.md"), "#x", TagMatch::Include, &meta));
        assert!(!node_matches(&Node::file("f", r, "none.md"), "#x", TagMatch::Include, &meta));
        assert!(node_matches(&Node::text("t", r, "see #x"), "#x", TagMatch::Include, &meta));
        assert!(!node_matches(&Node::text("t", r, "see #y"), "#x", TagMatch::Include, &meta));
    }

    #[test]
    fn exclude_is_the_complement_for_multi_tag_files() {
        let meta = metadata();
        let r = Region::default();
        // has "#x" among other tags: excluded
        assert!(!node_matches(&Node::file("f", r, "multi.md"), "#x", TagMatch::Exclude, &meta));
        assert!(node_matches(&Node::file("f", r, "none.md"), "#x", TagMatch::Exclude, &meta));
        assert!(node_matches(&Node::text("t", r, "plain"), "#x", TagMatch::Exclude, &meta));
    }

    #[test]
    fn links_and_groups_never_match() {
        let meta = metadata();
        let r = Region::default();
        for rule in [TagMatch::Include, TagMatch::Exclude] {
            assert!(!node_matches(&Node::link("l", r, "#x"), "#x", rule, &meta));
            assert!(!node_matches(&Node::group("g", r, "#x"), "#x", rule, &meta));
        }
    }

    #[test]
    fn normalizes_bare_tags() {
        assert_eq!(normalize_tag("x"), "#x");
        assert_eq!(normalize_tag(" #x "), "#x");
    }
}
