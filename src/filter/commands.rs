//! Filter commands and the dispatcher that runs them against a host canvas.
//!
//! Every command validates first and mutates second: a command that fails
//! leaves both the session and the presentation untouched.
//!
//! Tag filters are two-phase. [`CanvasFilter::run`] returns a
//! [`PendingTagChoice`] holding the snapshot and candidate tags; the host shows
//! its picker and later hands the choice to [`CanvasFilter::apply_tag_choice`].

use super::error::{FilterError, Result};
use super::reach::{reachable, Direction};
use super::session::FilterSession;
use super::tags::{node_matches, normalize_tag, tag_universe, MetadataSource, TagMatch};
use super::visibility::{
    apply_edge_visibility, apply_node_visibility, DisplayMode, PresentationSurface,
};
use crate::canvas::{edges_both_ends_in, with_enclosing_groups, CanvasSnapshot, Selection};
use std::collections::HashSet;

/// Message shown when color matching is broadened to colorless nodes
pub const COLORLESS_WARNING: &str = "Selection includes nodes without a color; colorless nodes will also be shown";

/// The host application as seen by the filter engine
pub trait CanvasHost: PresentationSurface {
    /// Whether the active view is a canvas
    fn is_canvas_view(&self) -> bool;

    /// Current nodes and edges
    fn snapshot(&self) -> CanvasSnapshot;

    fn selection(&self) -> Selection;

    fn clear_selection(&mut self);

    /// Show a one-line transient message
    fn notify(&mut self, message: &str);
}

/// Named actions exposed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterCommand {
    ToggleMode,
    ShowAll,
    ShowSameColor,
    HideSelected,
    HideSelectedWithConnections,
    ShowConnected,
    ShowUpstream,
    ShowDownstream,
    FilterByTag,
    FilterExcludingTag,
    FilterByTagAdditive,
    FilterExcludingTagAdditive,
}

impl FilterCommand {
    pub const ALL: [FilterCommand; 12] = [
        FilterCommand::ToggleMode,
        FilterCommand::ShowAll,
        FilterCommand::ShowSameColor,
        FilterCommand::HideSelected,
        FilterCommand::HideSelectedWithConnections,
        FilterCommand::ShowConnected,
        FilterCommand::ShowUpstream,
        FilterCommand::ShowDownstream,
        FilterCommand::FilterByTag,
        FilterCommand::FilterExcludingTag,
        FilterCommand::FilterByTagAdditive,
        FilterCommand::FilterExcludingTagAdditive,
    ];

    /// Stable identifier for keybindings and logs
    pub fn id(&self) -> &'static str {
        match self {
            FilterCommand::ToggleMode => "toggle-filter-mode",
            FilterCommand::ShowAll => "show-all",
            FilterCommand::ShowSameColor => "show-same-color",
            FilterCommand::HideSelected => "hide-selected",
            FilterCommand::HideSelectedWithConnections => "hide-selected-with-connections",
            FilterCommand::ShowConnected => "show-connected",
            FilterCommand::ShowUpstream => "show-upstream",
            FilterCommand::ShowDownstream => "show-downstream",
            FilterCommand::FilterByTag => "filter-by-tag",
            FilterCommand::FilterExcludingTag => "filter-excluding-tag",
            FilterCommand::FilterByTagAdditive => "filter-by-tag-additive",
            FilterCommand::FilterExcludingTagAdditive => "filter-excluding-tag-additive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterCommand::ToggleMode => "Toggle hide/fade",
            FilterCommand::ShowAll => "Show all",
            FilterCommand::ShowSameColor => "Show only same color",
            FilterCommand::HideSelected => "Hide selected",
            FilterCommand::HideSelectedWithConnections => "Hide selected + connections",
            FilterCommand::ShowConnected => "Show connected",
            FilterCommand::ShowUpstream => "Show upstream",
            FilterCommand::ShowDownstream => "Show downstream",
            FilterCommand::FilterByTag => "Filter by tag",
            FilterCommand::FilterExcludingTag => "Filter excluding tag",
            FilterCommand::FilterByTagAdditive => "Add tag to filter",
            FilterCommand::FilterExcludingTagAdditive => "Add all except tag",
        }
    }
}

/// A tag filter waiting for the user's pick
#[derive(Debug, Clone)]
pub struct PendingTagChoice {
    id: u64,
    snapshot: CanvasSnapshot,
    candidates: Vec<String>,
    rule: TagMatch,
    accumulate: bool,
}

impl PendingTagChoice {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Tags to offer, sorted
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn rule(&self) -> TagMatch {
        self.rule
    }

    /// Additive choices merge into the shown-set instead of replacing it
    pub fn is_additive(&self) -> bool {
        self.accumulate
    }
}

/// What a successful command produced
#[derive(Debug)]
pub enum CommandOutcome {
    /// Presentation and session were updated
    Applied,
    /// A tag filter is waiting for a pick
    AwaitingTag(PendingTagChoice),
}

/// Command dispatcher owning the filter session
#[derive(Debug, Default)]
pub struct CanvasFilter {
    session: FilterSession,
    next_request: u64,
}

impl CanvasFilter {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            session: FilterSession::new(mode),
            next_request: 0,
        }
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn mode(&self) -> DisplayMode {
        self.session.mode()
    }

    /// Run `command`. Validation failures are also reported through
    /// `host.notify`; running outside a canvas view is not.
    pub fn run<H: CanvasHost + ?Sized>(
        &mut self,
        command: FilterCommand,
        host: &mut H,
        metadata: &dyn MetadataSource,
    ) -> Result<CommandOutcome> {
        if !host.is_canvas_view() {
            return Err(FilterError::NotCanvasView);
        }
        tracing::debug!("Running {}", command.id());

        let result = self.dispatch(command, host, metadata);
        if let Err(err) = &result {
            host.notify(&err.to_string());
        }
        result
    }

    fn dispatch<H: CanvasHost + ?Sized>(
        &mut self,
        command: FilterCommand,
        host: &mut H,
        metadata: &dyn MetadataSource,
    ) -> Result<CommandOutcome> {
        match command {
            FilterCommand::ToggleMode => {
                let mode = self.session.toggle_mode();
                host.notify(&format!("Filter mode: {}", mode.label()));
            }
            FilterCommand::ShowAll => self.show_all(host),
            FilterCommand::ShowSameColor => self.show_same_color(host)?,
            FilterCommand::HideSelected => self.hide_selected(host, false)?,
            FilterCommand::HideSelectedWithConnections => self.hide_selected(host, true)?,
            FilterCommand::ShowConnected => self.show_connected(host, Direction::BOTH)?,
            FilterCommand::ShowUpstream => self.show_connected(host, Direction::UPSTREAM)?,
            FilterCommand::ShowDownstream => self.show_connected(host, Direction::DOWNSTREAM)?,
            FilterCommand::FilterByTag => {
                return Ok(self.request_tag_choice(TagMatch::Include, false, host, metadata));
            }
            FilterCommand::FilterExcludingTag => {
                return Ok(self.request_tag_choice(TagMatch::Exclude, false, host, metadata));
            }
            FilterCommand::FilterByTagAdditive => {
                return Ok(self.request_tag_choice(TagMatch::Include, true, host, metadata));
            }
            FilterCommand::FilterExcludingTagAdditive => {
                return Ok(self.request_tag_choice(TagMatch::Exclude, true, host, metadata));
            }
        }
        Ok(CommandOutcome::Applied)
    }

    /// Restore every element and forget the shown-set
    fn show_all<H: CanvasHost + ?Sized>(&mut self, host: &mut H) {
        let snapshot = host.snapshot();
        let mode = self.session.mode();
        apply_node_visibility(host, &snapshot.nodes, None, mode);
        apply_edge_visibility(host, &snapshot.edges, None, mode);
        self.session.clear_shown();
    }

    /// Show the closure of the selected nodes plus their enclosing groups
    fn show_connected<H: CanvasHost + ?Sized>(
        &mut self,
        host: &mut H,
        direction: Direction,
    ) -> Result<()> {
        let selection = host.selection();
        if selection.nodes.is_empty() {
            return Err(FilterError::EmptySelection);
        }
        let snapshot = host.snapshot();

        let seeds: HashSet<String> = selection.nodes.into_iter().collect();
        let closure = reachable(&snapshot.connected_edges(), &seeds, direction);
        let mut nodes = closure.nodes;
        with_enclosing_groups(&snapshot.nodes, &mut nodes);

        self.show_exactly(host, &snapshot, nodes, &closure.edges);
        Ok(())
    }

    /// Show every non-group node sharing a color with the selection
    fn show_same_color<H: CanvasHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let selection = host.selection();
        let snapshot = host.snapshot();

        let colors: HashSet<&str> = selection
            .nodes
            .iter()
            .filter_map(|id| snapshot.node(id))
            .map(|node| node.color_key())
            .collect();
        if colors.is_empty() {
            return Err(FilterError::EmptySelection);
        }
        if colors.contains("") {
            host.notify(COLORLESS_WARNING);
        }

        let mut nodes: HashSet<String> = snapshot
            .nodes
            .iter()
            .filter(|node| !node.is_group() && colors.contains(node.color_key()))
            .map(|node| node.id.clone())
            .collect();
        with_enclosing_groups(&snapshot.nodes, &mut nodes);
        let edges = edge_ids(&snapshot, &nodes);

        self.show_exactly(host, &snapshot, nodes, &edges);
        Ok(())
    }

    /// Dim or hide the selected elements in place
    fn hide_selected<H: CanvasHost + ?Sized>(
        &mut self,
        host: &mut H,
        with_connections: bool,
    ) -> Result<()> {
        let selection = host.selection();
        if selection.is_empty() {
            return Err(FilterError::EmptySelection);
        }
        let snapshot = host.snapshot();
        let state = self.session.mode().filtered_state();

        for id in &selection.nodes {
            host.set_node_state(id, state);
            if with_connections {
                for edge in snapshot.edges.iter().filter(|e| e.touches(id)) {
                    host.set_edge_state(&edge.id, state);
                }
            }
        }
        for id in &selection.edges {
            host.set_edge_state(id, state);
        }

        tracing::debug!(
            "Hid {} nodes and {} edges ({})",
            selection.nodes.len(),
            selection.edges.len(),
            self.session.mode().label()
        );
        host.clear_selection();
        Ok(())
    }

    /// Capture the snapshot and candidate tags for a tag filter
    fn request_tag_choice<H: CanvasHost + ?Sized>(
        &mut self,
        rule: TagMatch,
        accumulate: bool,
        host: &mut H,
        metadata: &dyn MetadataSource,
    ) -> CommandOutcome {
        let snapshot = host.snapshot();
        let candidates = tag_universe(&snapshot, metadata);
        self.next_request += 1;
        tracing::debug!(
            "Tag request {}: {} candidates",
            self.next_request,
            candidates.len()
        );
        CommandOutcome::AwaitingTag(PendingTagChoice {
            id: self.next_request,
            snapshot,
            candidates,
            rule,
            accumulate,
        })
    }

    /// Apply the user's pick for `pending` against the snapshot captured when
    /// it was requested. May be called repeatedly with the same request.
    /// Returns the number of nodes now shown.
    pub fn apply_tag_choice<H: CanvasHost + ?Sized>(
        &mut self,
        pending: &PendingTagChoice,
        tag: &str,
        host: &mut H,
        metadata: &dyn MetadataSource,
    ) -> usize {
        let tag = normalize_tag(tag);
        let snapshot = &pending.snapshot;

        let mut matched: HashSet<String> = snapshot
            .nodes
            .iter()
            .filter(|node| node_matches(node, &tag, pending.rule, metadata))
            .map(|node| node.id.clone())
            .collect();
        with_enclosing_groups(&snapshot.nodes, &mut matched);
        tracing::debug!(
            "Tag {} ({:?}, request {}): {} nodes matched",
            tag,
            pending.rule,
            pending.id,
            matched.len()
        );

        if pending.accumulate {
            let shown = self.session.accumulate(matched).clone();
            let edges = edge_ids(snapshot, &shown);
            apply_shown(host, snapshot, &shown, &edges, self.session.mode());
            shown.len()
        } else {
            let shown = matched.len();
            let edges = edge_ids(snapshot, &matched);
            self.show_exactly(host, snapshot, matched, &edges);
            shown
        }
    }

    /// Replace the shown-set with `nodes` and apply it
    fn show_exactly<H: CanvasHost + ?Sized>(
        &mut self,
        host: &mut H,
        snapshot: &CanvasSnapshot,
        nodes: HashSet<String>,
        edges: &HashSet<String>,
    ) {
        apply_shown(host, snapshot, &nodes, edges, self.session.mode());
        self.session.replace_shown(nodes);
    }
}

fn edge_ids(snapshot: &CanvasSnapshot, nodes: &HashSet<String>) -> HashSet<String> {
    edges_both_ends_in(&snapshot.edges, nodes)
        .into_iter()
        .map(|e| e.id.clone())
        .collect()
}

fn apply_shown<H: CanvasHost + ?Sized>(
    host: &mut H,
    snapshot: &CanvasSnapshot,
    nodes: &HashSet<String>,
    edges: &HashSet<String>,
    mode: DisplayMode,
) {
    tracing::debug!(
        "Showing {} of {} nodes, {} of {} edges",
        nodes.len(),
        snapshot.nodes.len(),
        edges.len(),
        snapshot.edges.len()
    );
    apply_node_visibility(host, &snapshot.nodes, Some(nodes), mode);
    apply_edge_visibility(host, &snapshot.edges, Some(edges), mode);
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
