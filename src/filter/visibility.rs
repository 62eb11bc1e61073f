//! Applying a target set to the presentation of every node and edge.

use crate::canvas::{Edge, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opacity used for elements dimmed in fade mode
pub const FADED_OPACITY: f32 = 0.3;

/// How elements outside the target set are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Removed from layout entirely
    #[default]
    Hide,
    /// Kept in layout at reduced opacity
    Fade,
}

impl DisplayMode {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Hide => "Hide",
            DisplayMode::Fade => "Fade",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Hide => DisplayMode::Fade,
            DisplayMode::Fade => DisplayMode::Hide,
        }
    }

    /// Presentation for an element that is filtered out under this mode
    pub fn filtered_state(&self) -> ElementState {
        match self {
            DisplayMode::Hide => ElementState::HIDDEN,
            DisplayMode::Fade => ElementState::FADED,
        }
    }
}

/// The two presentation properties this crate writes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementState {
    pub hidden: bool,
    pub opacity: f32,
}

impl ElementState {
    pub const VISIBLE: ElementState = ElementState {
        hidden: false,
        opacity: 1.0,
    };
    pub const HIDDEN: ElementState = ElementState {
        hidden: true,
        opacity: 1.0,
    };
    pub const FADED: ElementState = ElementState {
        hidden: false,
        opacity: FADED_OPACITY,
    };
}

impl Default for ElementState {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Writable presentation of live canvas elements.
///
/// Setters return `false` when the id has no live counterpart; such ids are
/// skipped.
pub trait PresentationSurface {
    fn set_node_state(&mut self, id: &str, state: ElementState) -> bool;
    fn set_edge_state(&mut self, id: &str, state: ElementState) -> bool;
}

fn state_for(id: &str, target: Option<&HashSet<String>>, mode: DisplayMode) -> ElementState {
    match target {
        None => ElementState::VISIBLE,
        Some(shown) if shown.contains(id) => ElementState::VISIBLE,
        Some(_) => mode.filtered_state(),
    }
}

/// Set every node visible, or filter against `target` when given.
pub fn apply_node_visibility<S: PresentationSurface + ?Sized>(
    surface: &mut S,
    nodes: &[Node],
    target: Option<&HashSet<String>>,
    mode: DisplayMode,
) {
    let mut skipped = 0;
    for node in nodes {
        if !surface.set_node_state(&node.id, state_for(&node.id, target, mode)) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::debug!("Skipped {} nodes without a live counterpart", skipped);
    }
}

/// Set every edge visible, or filter against `target` when given.
pub fn apply_edge_visibility<S: PresentationSurface + ?Sized>(
    surface: &mut S,
    edges: &[Edge],
    target: Option<&HashSet<String>>,
    mode: DisplayMode,
) {
    let mut skipped = 0;
    for edge in edges {
        if !surface.set_edge_state(&edge.id, state_for(&edge.id, target, mode)) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::debug!("Skipped {} edges without a live counterpart", skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Region;
    use std::collections::HashMap;

    /// Surface that only knows the ids it was created with
    #[derive(Default, Debug, PartialEq)]
    struct MapSurface {
        nodes: HashMap<String, ElementState>,
        edges: HashMap<String, ElementState>,
    }

    impl MapSurface {
        fn with(nodes: &[&str], edges: &[&str]) -> Self {
            Self {
                nodes: nodes.iter().map(|id| (id.to_string(), ElementState::VISIBLE)).collect(),
                edges: edges.iter().map(|id| (id.to_string(), ElementState::VISIBLE)).collect(),
            }
        }
    }

    impl PresentationSurface for MapSurface {
        fn set_node_state(&mut self, id: &str, state: ElementState) -> bool {
            match self.nodes.get_mut(id) {
                Some(slot) => {
                    *slot = state;
                    true
                }
                None => false,
            }
        }

        fn set_edge_state(&mut self, id: &str, state: ElementState) -> bool {
            match self.edges.get_mut(id) {
                Some(slot) => {
                    *slot = state;
                    true
                }
                None => false,
            }
        }
    }

    fn nodes() -> Vec<Node> {
        ["a", "b", "c"]
            .iter()
            .map(|id| Node::text(id, Region::default(), id))
            .collect()
    }

    fn target(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hide_mode_hides_everything_outside_the_target() {
        let mut surface = MapSurface::with(&["a", "b", "c"], &[]);
        apply_node_visibility(&mut surface, &nodes(), Some(&target(&["a"])), DisplayMode::Hide);
        assert_eq!(surface.nodes["a"], ElementState::VISIBLE);
        assert!(surface.nodes["b"].hidden);
        assert!(surface.nodes["c"].hidden);
    }

    #[test]
    fn fade_mode_dims_instead_of_hiding() {
        let mut surface = MapSurface::with(&["a", "b", "c"], &[]);
        apply_node_visibility(&mut surface, &nodes(), Some(&target(&["b"])), DisplayMode::Fade);
        assert_eq!(surface.nodes["b"], ElementState::VISIBLE);
        assert!(!surface.nodes["a"].hidden);
        assert_eq!(surface.nodes["a"].opacity, FADED_OPACITY);
    }

    #[test]
    fn no_target_restores_everything() {
        let mut surface = MapSurface::with(&["a", "b", "c"], &[]);
        apply_node_visibility(&mut surface, &nodes(), Some(&target(&[])), DisplayMode::Hide);
        apply_node_visibility(&mut surface, &nodes(), None, DisplayMode::Hide);
        assert!(surface.nodes.values().all(|s| *s == ElementState::VISIBLE));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let shown = target(&["a", "c"]);
        let mut once = MapSurface::with(&["a", "b", "c"], &[]);
        apply_node_visibility(&mut once, &nodes(), Some(&shown), DisplayMode::Fade);

        let mut twice = MapSurface::with(&["a", "b", "c"], &[]);
        apply_node_visibility(&mut twice, &nodes(), Some(&shown), DisplayMode::Fade);
        apply_node_visibility(&mut twice, &nodes(), Some(&shown), DisplayMode::Fade);

        assert_eq!(once, twice);
    }

    #[test]
    fn missing_live_counterparts_are_skipped() {
        // "c" and edge "e2" have no live object
        let mut surface = MapSurface::with(&["a", "b"], &["e1"]);
        let edges = vec![Edge::new("e1", "a", "b"), Edge::new("e2", "b", "c")];
        apply_node_visibility(&mut surface, &nodes(), Some(&target(&["a"])), DisplayMode::Hide);
        apply_edge_visibility(&mut surface, &edges, Some(&target(&[])), DisplayMode::Hide);
        assert_eq!(surface.nodes.len(), 2);
        assert!(surface.nodes["b"].hidden);
        assert!(surface.edges["e1"].hidden);
    }

    #[test]
    fn mode_toggles_between_two_values() {
        assert_eq!(DisplayMode::Hide.toggled(), DisplayMode::Fade);
        assert_eq!(DisplayMode::Fade.toggled(), DisplayMode::Hide);
    }
}
