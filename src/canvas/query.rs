//! Pure queries over node/edge collections.

use super::geometry::encloses;
use super::types::{Edge, Node};
use std::collections::HashSet;

/// Every group in `all_nodes` whose region encloses at least one of `targets`,
/// in `all_nodes` order.
pub fn groups_for<'a>(all_nodes: &'a [Node], targets: &[&Node]) -> Vec<&'a Node> {
    all_nodes
        .iter()
        .filter(|node| node.is_group())
        .filter(|group| targets.iter().any(|t| encloses(&group.region, &t.region)))
        .collect()
}

/// Edges whose `from` and `to` are both in `node_ids`.
pub fn edges_both_ends_in<'a>(all_edges: &'a [Edge], node_ids: &HashSet<String>) -> Vec<&'a Edge> {
    all_edges
        .iter()
        .filter(|e| node_ids.contains(&e.from) && node_ids.contains(&e.to))
        .collect()
}

/// Extend `node_ids` with the ids of groups enclosing any of its members.
pub fn with_enclosing_groups(all_nodes: &[Node], node_ids: &mut HashSet<String>) {
    let members: Vec<&Node> = all_nodes
        .iter()
        .filter(|n| node_ids.contains(&n.id))
        .collect();
    let groups: Vec<String> = groups_for(all_nodes, &members)
        .into_iter()
        .map(|g| g.id.clone())
        .collect();
    node_ids.extend(groups);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::geometry::Region;

    fn ids(edges: &[&Edge]) -> Vec<String> {
        edges.iter().map(|e| e.id.clone()).collect()
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_are_found_by_containment() {
        let nodes = vec![
            Node::group("outer", Region::new(0.0, 0.0, 1000.0, 1000.0), "Outer"),
            Node::text("a", Region::new(10.0, 10.0, 100.0, 50.0), "a"),
            Node::group("left", Region::new(0.0, 0.0, 200.0, 200.0), "Left"),
            Node::text("far", Region::new(2000.0, 0.0, 100.0, 50.0), "far"),
            Node::group("right", Region::new(500.0, 0.0, 200.0, 200.0), "Right"),
        ];
        let targets = vec![&nodes[1]];
        let found: Vec<&str> = groups_for(&nodes, &targets)
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(found, vec!["outer", "left"]);
    }

    #[test]
    fn non_groups_never_count_as_enclosing() {
        let nodes = vec![
            Node::text("big", Region::new(0.0, 0.0, 1000.0, 1000.0), "big"),
            Node::text("a", Region::new(10.0, 10.0, 10.0, 10.0), "a"),
        ];
        assert!(groups_for(&nodes, &[&nodes[1]]).is_empty());
    }

    #[test]
    fn edge_needs_both_endpoints() {
        let edges = vec![
            Edge::new("ab", "a", "b"),
            Edge::new("bc", "b", "c"),
            Edge::new("ca", "c", "a"),
            Edge::new("aa", "a", "a"),
        ];
        let shown = edges_both_ends_in(&edges, &set(&["a", "b"]));
        assert_eq!(ids(&shown), vec!["ab", "aa"]);
    }

    #[test]
    fn empty_node_set_shows_no_edges() {
        let edges = vec![Edge::new("ab", "a", "b")];
        assert!(edges_both_ends_in(&edges, &HashSet::new()).is_empty());
    }

    #[test]
    fn enclosing_groups_are_merged_in() {
        let nodes = vec![
            Node::file("n1", Region::new(10.0, 10.0, 50.0, 50.0), "n1.md"),
            Node::group("g", Region::new(0.0, 0.0, 100.0, 100.0), "G"),
            Node::group("other", Region::new(500.0, 500.0, 100.0, 100.0), "Other"),
        ];
        let mut shown = set(&["n1"]);
        with_enclosing_groups(&nodes, &mut shown);
        assert_eq!(shown, set(&["n1", "g"]));
    }
}
