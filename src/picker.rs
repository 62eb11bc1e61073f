//! Fuzzy ranking for the tag picker.

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32String};

/// Fuzzy search over picker candidates using nucleo-matcher
pub struct FuzzyPicker {
    matcher: Matcher,
}

impl Default for FuzzyPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyPicker {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    /// Indices of `candidates` matching `query`, best first, at most `limit`.
    /// An empty query keeps the original order.
    pub fn rank(&mut self, query: &str, candidates: &[String], limit: usize) -> Vec<usize> {
        let query = query.trim();
        if query.is_empty() {
            return (0..candidates.len().min(limit)).collect();
        }

        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        let mut scored: Vec<(usize, u32)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, candidate)| {
                let haystack = Utf32String::from(candidate.as_str());
                pattern
                    .score(haystack.slice(..), &mut self.matcher)
                    .map(|score| (idx, score))
            })
            .collect();

        // Sort by score descending, ties keep candidate order
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        scored.into_iter().map(|(idx, _)| idx).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        ["#alpha", "#beta", "#project/alpha", "#gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn empty_query_lists_everything_up_to_limit() {
        let mut picker = FuzzyPicker::new();
        assert_eq!(picker.rank("", &tags(), 10), vec![0, 1, 2, 3]);
        assert_eq!(picker.rank("  ", &tags(), 2), vec![0, 1]);
    }

    #[test]
    fn query_filters_out_non_matches() {
        let mut picker = FuzzyPicker::new();
        let hits = picker.rank("alpha", &tags(), 10);
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&0));
        assert!(hits.contains(&2));
    }

    #[test]
    fn no_match_is_empty() {
        let mut picker = FuzzyPicker::new();
        assert!(picker.rank("zzz", &tags(), 10).is_empty());
    }
}
