//! In-memory live canvas: graph, selection, and per-element presentation.

use super::types::{CanvasData, CanvasSnapshot, Selection};
use crate::filter::{CanvasHost, ElementState, PresentationSurface};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Live canvas state owned by the host
#[derive(Debug, Clone)]
pub struct LiveCanvas {
    data: Arc<CanvasData>,
    node_states: HashMap<String, ElementState>,
    edge_states: HashMap<String, ElementState>,
    selection: Selection,
    /// Messages raised since the last `take_notices`
    notices: Vec<String>,
    canvas_view: bool,
}

impl LiveCanvas {
    /// Wrap `data` with every element visible and nothing selected
    pub fn new(data: CanvasData) -> Self {
        let node_states = data
            .nodes
            .iter()
            .map(|n| (n.id.clone(), ElementState::VISIBLE))
            .collect();
        let edge_states = data
            .edges
            .iter()
            .map(|e| (e.id.clone(), ElementState::VISIBLE))
            .collect();
        Self {
            data: Arc::new(data),
            node_states,
            edge_states,
            selection: Selection::default(),
            notices: Vec::new(),
            canvas_view: true,
        }
    }

    pub fn data(&self) -> &CanvasData {
        &self.data
    }

    pub fn node_state(&self, id: &str) -> Option<ElementState> {
        self.node_states.get(id).copied()
    }

    pub fn edge_state(&self, id: &str) -> Option<ElementState> {
        self.edge_states.get(id).copied()
    }

    /// Ids of nodes that are neither hidden nor dimmed
    pub fn fully_visible_nodes(&self) -> HashSet<String> {
        fully_visible(&self.node_states)
    }

    /// Ids of edges that are neither hidden nor dimmed
    pub fn fully_visible_edges(&self) -> HashSet<String> {
        fully_visible(&self.edge_states)
    }

    pub fn current_selection(&self) -> &Selection {
        &self.selection
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Select a node, either alone or toggled into the current selection
    pub fn click_node(&mut self, id: &str, extend: bool) {
        if !extend {
            self.selection = Selection::default();
        }
        if let Some(pos) = self.selection.nodes.iter().position(|n| n == id) {
            self.selection.nodes.remove(pos);
        } else {
            self.selection.nodes.push(id.to_string());
        }
    }

    /// Select an edge, either alone or toggled into the current selection
    pub fn click_edge(&mut self, id: &str, extend: bool) {
        if !extend {
            self.selection = Selection::default();
        }
        if let Some(pos) = self.selection.edges.iter().position(|e| e == id) {
            self.selection.edges.remove(pos);
        } else {
            self.selection.edges.push(id.to_string());
        }
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_canvas_view(&mut self, active: bool) {
        self.canvas_view = active;
    }

    /// Drop the presentation object for a node, as a stale view would
    pub fn detach_node(&mut self, id: &str) {
        self.node_states.remove(id);
    }
}

fn fully_visible(states: &HashMap<String, ElementState>) -> HashSet<String> {
    states
        .iter()
        .filter(|(_, s)| **s == ElementState::VISIBLE)
        .map(|(id, _)| id.clone())
        .collect()
}

impl PresentationSurface for LiveCanvas {
    fn set_node_state(&mut self, id: &str, state: ElementState) -> bool {
        match self.node_states.get_mut(id) {
            Some(slot) => {
                *slot = state;
                true
            }
            None => false,
        }
    }

    fn set_edge_state(&mut self, id: &str, state: ElementState) -> bool {
        match self.edge_states.get_mut(id) {
            Some(slot) => {
                *slot = state;
                true
            }
            None => false,
        }
    }
}

impl CanvasHost for LiveCanvas {
    fn is_canvas_view(&self) -> bool {
        self.canvas_view
    }

    fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot::new(Arc::clone(&self.data))
    }

    fn selection(&self) -> Selection {
        self.selection.clone()
    }

    fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("{}", message);
        self.notices.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Edge, Node, Region};

    fn canvas() -> LiveCanvas {
        LiveCanvas::new(CanvasData::new(
            vec![
                Node::text("a", Region::default(), "a"),
                Node::text("b", Region::default(), "b"),
            ],
            vec![Edge::new("ab", "a", "b")],
        ))
    }

    #[test]
    fn starts_fully_visible() {
        let live = canvas();
        assert_eq!(live.fully_visible_nodes().len(), 2);
        assert_eq!(live.fully_visible_edges().len(), 1);
        assert!(live.current_selection().is_empty());
    }

    #[test]
    fn click_replaces_or_toggles_selection() {
        let mut live = canvas();
        live.click_node("a", false);
        live.click_node("b", true);
        assert_eq!(live.current_selection().nodes, vec!["a", "b"]);
        live.click_node("a", true);
        assert_eq!(live.current_selection().nodes, vec!["b"]);
        live.click_edge("ab", false);
        assert!(live.current_selection().nodes.is_empty());
        assert!(live.current_selection().contains_edge("ab"));
    }

    #[test]
    fn unknown_ids_report_no_counterpart() {
        let mut live = canvas();
        assert!(!live.set_node_state("zz", ElementState::HIDDEN));
        live.detach_node("a");
        assert!(!live.set_node_state("a", ElementState::HIDDEN));
        assert!(live.set_edge_state("ab", ElementState::FADED));
        assert_eq!(live.edge_state("ab"), Some(ElementState::FADED));
    }
}
