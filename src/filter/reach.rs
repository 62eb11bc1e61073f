//! Upstream/downstream closure over directed edges.
//!
//! Expansion is breadth-first, one level per iteration. A node enters the
//! closure once and is expanded once, so cycles terminate.

use crate::canvas::Edge;
use std::collections::{HashMap, HashSet};

/// Which directions to follow from the seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub upstream: bool,
    pub downstream: bool,
}

impl Direction {
    pub const BOTH: Direction = Direction {
        upstream: true,
        downstream: true,
    };
    pub const UPSTREAM: Direction = Direction {
        upstream: true,
        downstream: false,
    };
    pub const DOWNSTREAM: Direction = Direction {
        upstream: false,
        downstream: true,
    };
    pub const NONE: Direction = Direction {
        upstream: false,
        downstream: false,
    };
}

/// Result of a reachability run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Seeds plus every reached node
    pub nodes: HashSet<String>,
    /// Edges crossed while expanding
    pub edges: HashSet<String>,
}

/// Adjacency keyed by node id: outgoing and incoming edges
struct Adjacency<'a> {
    outgoing: HashMap<&'a str, Vec<&'a Edge>>,
    incoming: HashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> Adjacency<'a> {
    fn build(edges: &'a [Edge]) -> Self {
        let mut outgoing: HashMap<&str, Vec<&Edge>> = HashMap::new();
        let mut incoming: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in edges {
            outgoing.entry(edge.from.as_str()).or_default().push(edge);
            incoming.entry(edge.to.as_str()).or_default().push(edge);
        }
        Self { outgoing, incoming }
    }
}

/// Compute the closure of `seeds` under `direction`.
///
/// Callers must reject an empty seed set before calling; with no seeds the
/// result is simply empty.
pub fn reachable(edges: &[Edge], seeds: &HashSet<String>, direction: Direction) -> Closure {
    let adjacency = Adjacency::build(edges);
    let mut closure = Closure {
        nodes: seeds.clone(),
        edges: HashSet::new(),
    };
    let mut frontier: Vec<String> = seeds.iter().cloned().collect();

    while !frontier.is_empty() {
        let mut next = Vec::new();

        for id in &frontier {
            if direction.downstream {
                for edge in adjacency.outgoing.get(id.as_str()).into_iter().flatten() {
                    closure.edges.insert(edge.id.clone());
                    if closure.nodes.insert(edge.to.clone()) {
                        next.push(edge.to.clone());
                    }
                }
            }
            if direction.upstream {
                for edge in adjacency.incoming.get(id.as_str()).into_iter().flatten() {
                    closure.edges.insert(edge.id.clone());
                    if closure.nodes.insert(edge.from.clone()) {
                        next.push(edge.from.clone());
                    }
                }
            }
        }

        frontier = next;
    }

    tracing::debug!(
        "Reachability from {} seeds: {} nodes, {} edges",
        seeds.len(),
        closure.nodes.len(),
        closure.edges.len()
    );
    closure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn chain() -> Vec<Edge> {
        // N1 -> N2 -> N3
        vec![Edge::new("e12", "N1", "N2"), Edge::new("e23", "N2", "N3")]
    }

    #[test]
    fn downstream_follows_the_chain() {
        let result = reachable(&chain(), &set(&["N1"]), Direction::DOWNSTREAM);
        assert_eq!(result.nodes, set(&["N1", "N2", "N3"]));
        assert_eq!(result.edges, set(&["e12", "e23"]));
    }

    #[test]
    fn upstream_from_a_source_is_just_the_seed() {
        let result = reachable(&chain(), &set(&["N1"]), Direction::UPSTREAM);
        assert_eq!(result.nodes, set(&["N1"]));
        assert!(result.edges.is_empty());
    }

    #[test]
    fn upstream_from_the_sink() {
        let result = reachable(&chain(), &set(&["N3"]), Direction::UPSTREAM);
        assert_eq!(result.nodes, set(&["N1", "N2", "N3"]));
        assert_eq!(result.edges, set(&["e12", "e23"]));
    }

    #[test]
    fn both_directions_from_the_middle() {
        let mut edges = chain();
        edges.push(Edge::new("e45", "N4", "N5"));
        let result = reachable(&edges, &set(&["N2"]), Direction::BOTH);
        assert_eq!(result.nodes, set(&["N1", "N2", "N3"]));
        assert_eq!(result.edges, set(&["e12", "e23"]));
    }

    #[test]
    fn no_direction_returns_seeds_only() {
        let result = reachable(&chain(), &set(&["N1", "N2"]), Direction::NONE);
        assert_eq!(result.nodes, set(&["N1", "N2"]));
        assert!(result.edges.is_empty());
    }

    #[test]
    fn cycles_terminate_without_duplicates() {
        // A -> B -> C -> A, plus C -> D
        let edges = vec![
            Edge::new("ab", "A", "B"),
            Edge::new("bc", "B", "C"),
            Edge::new("ca", "C", "A"),
            Edge::new("cd", "C", "D"),
        ];
        let result = reachable(&edges, &set(&["A"]), Direction::BOTH);
        assert_eq!(result.nodes, set(&["A", "B", "C", "D"]));
        assert_eq!(result.edges, set(&["ab", "bc", "ca", "cd"]));
    }

    #[test]
    fn closure_is_idempotent() {
        let edges = vec![
            Edge::new("ab", "A", "B"),
            Edge::new("bc", "B", "C"),
            Edge::new("xb", "X", "B"),
        ];
        let first = reachable(&edges, &set(&["A"]), Direction::DOWNSTREAM);
        let again = reachable(&edges, &set(&["A"]), Direction::DOWNSTREAM);
        assert_eq!(first, again);

        // Re-seeding with the closure reaches nothing new
        let reseeded = reachable(&edges, &first.nodes, Direction::DOWNSTREAM);
        assert_eq!(reseeded.nodes, first.nodes);
    }

    #[test]
    fn downstream_does_not_walk_back_up() {
        // A -> B <- X : downstream from A must not pick up X
        let edges = vec![Edge::new("ab", "A", "B"), Edge::new("xb", "X", "B")];
        let result = reachable(&edges, &set(&["A"]), Direction::DOWNSTREAM);
        assert_eq!(result.nodes, set(&["A", "B"]));
        assert_eq!(result.edges, set(&["ab"]));
    }
}
