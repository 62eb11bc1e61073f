//! Main application state and UI.

use canvas_filter::canvas::{CanvasData, LiveCanvas, Node, NodeKind};
use canvas_filter::filter::{
    CanvasFilter, CommandOutcome, DisplayMode, ElementState, FilterCommand, MetadataSource,
    NoMetadata, PendingTagChoice, TagMatch,
};
use canvas_filter::metadata::VaultMetadata;
use canvas_filter::picker::FuzzyPicker;
use canvas_filter::settings::Settings;
use canvas_filter::theme;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a notification stays on screen
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Click tolerance around edges, in screen pixels
const EDGE_HIT_DISTANCE: f32 = 6.0;

/// A transient one-line message
struct Toast {
    message: String,
    shown_at: Instant,
}

/// Open tag picker: the pending request plus the search text
struct TagPickerState {
    pending: PendingTagChoice,
    query: String,
}

/// Something under the pointer
enum Hit {
    Node(String),
    Edge(String),
}

/// Main canvas viewer application
pub struct CanvasApp {
    // Canvas state
    canvas_path: Option<PathBuf>,
    live: Option<LiveCanvas>,
    metadata: Box<dyn MetadataSource>,
    load_error: Option<String>,
    path_input: String,

    // Filtering
    filter: CanvasFilter,
    picker: Option<TagPickerState>,
    fuzzy: FuzzyPicker,
    toasts: Vec<Toast>,

    // Viewport state
    pan_offset: Vec2,
    zoom: f32,
    hovered: Option<String>,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl CanvasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, canvas_arg: Option<PathBuf>) -> Self {
        let settings = Settings::load();

        let mut app = Self {
            canvas_path: None,
            live: None,
            metadata: Box::new(NoMetadata),
            load_error: None,
            path_input: String::new(),
            filter: CanvasFilter::new(settings.start_mode),
            picker: None,
            fuzzy: FuzzyPicker::new(),
            toasts: Vec::new(),
            pan_offset: Vec2::ZERO,
            zoom: 1.0,
            hovered: None,
            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        };

        // Command line wins over the last opened canvas
        if let Some(path) = canvas_arg.or_else(|| app.settings.last_canvas.clone()) {
            app.open_canvas(&path);
        }

        app
    }

    /// Load a `.canvas` file, replacing the current one
    fn open_canvas(&mut self, path: &Path) {
        self.path_input = path.display().to_string();
        match CanvasData::load(path) {
            Ok(data) => {
                let vault = self.settings.vault_for(path);
                tracing::info!("Using {:?} for file tags", vault);
                self.metadata = Box::new(VaultMetadata::new(vault));
                self.live = Some(LiveCanvas::new(data));
                self.canvas_path = Some(path.to_path_buf());
                self.load_error = None;
                self.picker = None;
                // A fresh canvas starts unfiltered; the mode carries over
                self.filter = CanvasFilter::new(self.filter.mode());
                self.pan_offset = Vec2::ZERO;
                self.zoom = 1.0;

                self.settings.last_canvas = Some(path.to_path_buf());
                self.mark_settings_dirty();
            }
            Err(e) => {
                tracing::warn!("Could not open {:?}: {}", path, e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Mark settings as needing to be saved
    fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.settings.start_mode = self.filter.mode();
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    fn toast(&mut self, message: impl Into<String>) {
        self.toasts.push(Toast {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Move messages raised by the filter engine into toasts
    fn collect_notices(&mut self) {
        let notices = self
            .live
            .as_mut()
            .map(LiveCanvas::take_notices)
            .unwrap_or_default();
        for message in notices {
            self.toast(message);
        }
    }

    fn run_command(&mut self, command: FilterCommand) {
        let Some(live) = self.live.as_mut() else {
            return;
        };

        match self.filter.run(command, live, self.metadata.as_ref()) {
            Ok(CommandOutcome::Applied) => {}
            Ok(CommandOutcome::AwaitingTag(pending)) => {
                self.picker = Some(TagPickerState {
                    pending,
                    query: String::new(),
                });
            }
            Err(e) => tracing::debug!("{} not applied: {}", command.id(), e),
        }

        if command == FilterCommand::ToggleMode {
            self.mark_settings_dirty();
        }
        self.collect_notices();
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Canvas Filter");
        ui.add_space(10.0);

        // File selection
        egui::CollapsingHeader::new("Canvas")
            .default_open(true)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.path_input)
                        .hint_text("path/to/board.canvas"),
                );
                if ui.button("Open").clicked() && !self.path_input.trim().is_empty() {
                    let path = PathBuf::from(self.path_input.trim());
                    self.open_canvas(&path);
                }
                if let Some(ref err) = self.load_error {
                    ui.colored_label(theme::accent::RED, format!("Error: {}", err));
                }
                if let (Some(live), Some(path)) = (&self.live, &self.canvas_path) {
                    let name = path.file_name().unwrap_or(path.as_os_str());
                    ui.label(
                        egui::RichText::new(format!(
                            "{}: {} nodes, {} edges",
                            name.to_string_lossy(),
                            live.data().nodes.len(),
                            live.data().edges.len()
                        ))
                        .color(theme::text::MUTED),
                    );
                }
            });

        ui.add_space(10.0);

        let enabled = self.live.is_some();

        // Mode
        ui.horizontal(|ui| {
            let mode = self.filter.mode();
            let color = match mode {
                DisplayMode::Hide => theme::state::HIDE,
                DisplayMode::Fade => theme::state::FADE,
            };
            ui.colored_label(color, format!("● Mode: {}", mode.label()));
            if ui
                .add_enabled(enabled, egui::Button::new("Toggle"))
                .clicked()
            {
                self.run_command(FilterCommand::ToggleMode);
            }
        });

        ui.add_space(10.0);

        egui::CollapsingHeader::new("Filters")
            .default_open(true)
            .show(ui, |ui| {
                for command in FilterCommand::ALL {
                    if command == FilterCommand::ToggleMode {
                        continue;
                    }
                    if ui
                        .add_enabled(enabled, egui::Button::new(command.label()))
                        .clicked()
                    {
                        self.run_command(command);
                    }
                }
            });

        ui.add_space(10.0);

        // Selection / session summary
        if let Some(live) = &self.live {
            let selection = live.current_selection();
            ui.label(format!(
                "Selected: {} nodes, {} edges",
                selection.nodes.len(),
                selection.edges.len()
            ));
            let shown = self.filter.session().shown().len();
            if shown > 0 {
                ui.label(format!("Filter shows {} nodes", shown));
            }
        }

        ui.add_space(10.0);

        egui::CollapsingHeader::new("Display")
            .default_open(false)
            .show(ui, |ui| {
                if ui
                    .checkbox(&mut self.settings.show_arrows, "Show arrows")
                    .changed()
                {
                    self.mark_settings_dirty();
                }
                if ui.button("Reset view").clicked() {
                    self.pan_offset = Vec2::ZERO;
                    self.zoom = 1.0;
                }
            });
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;

        let Some(live) = self.live.as_ref() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Open a .canvas file to begin",
                FontId::proportional(16.0),
                theme::text::MUTED,
            );
            return;
        };

        // Gather all input deltas first (allows simultaneous pan+zoom on trackpad)
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        let zoom_delta = ui.input(|i| i.zoom_delta());
        let hover_pos = response.hover_pos();
        let center = rect.center();

        if response.dragged_by(egui::PointerButton::Primary) {
            self.pan_offset += response.drag_delta();
        }
        if scroll_delta != Vec2::ZERO && response.hovered() {
            self.pan_offset += scroll_delta;
        }
        if let Some(cursor_pos) = hover_pos {
            if zoom_delta != 1.0 {
                let new_zoom = (self.zoom * zoom_delta).clamp(0.05, 5.0);

                // Zoom toward cursor: adjust pan so point under cursor stays fixed
                let cursor_offset = cursor_pos - center - self.pan_offset;
                let zoom_factor = 1.0 - new_zoom / self.zoom;
                self.pan_offset += cursor_offset * zoom_factor;

                self.zoom = new_zoom;
            }
        }

        // Canvas space -> screen space, centered on the content bounds
        let origin = content_bounds(&live.data().nodes).center();
        let pan_offset = self.pan_offset;
        let zoom = self.zoom;
        let to_screen = |r: Rect| -> Rect {
            let min = center + (r.min - origin) * zoom + pan_offset;
            Rect::from_min_size(min, r.size() * zoom)
        };

        let state_of = |id: &str| live.node_state(id).unwrap_or(ElementState::VISIBLE);
        let selection = live.current_selection();
        let data = live.data();

        // Groups first so content sits on top
        for node in data.nodes.iter().filter(|n| n.is_group()) {
            let state = state_of(&node.id);
            if state.hidden {
                continue;
            }
            let screen = to_screen(node.region.to_rect());
            let color = theme::canvas_color(node.color.as_deref(), theme::border::DEFAULT);
            painter.rect(
                screen,
                6.0 * zoom,
                color.gamma_multiply(0.08 * state.opacity),
                node_stroke(color, state, selection.contains_node(&node.id), false),
            );
            painter.text(
                screen.left_top() + Vec2::new(4.0, -4.0),
                Align2::LEFT_BOTTOM,
                node.display_label(),
                FontId::proportional(14.0 * zoom.max(0.5)),
                theme::text::SECONDARY.gamma_multiply(state.opacity),
            );
        }

        // Edges
        let mut edge_hits: Vec<(String, Pos2, Pos2)> = Vec::new();
        for edge in &data.edges {
            let state = live.edge_state(&edge.id).unwrap_or(ElementState::VISIBLE);
            if state.hidden {
                continue;
            }
            let (Some(from), Some(to)) = (data.node(&edge.from), data.node(&edge.to)) else {
                continue;
            };
            let start = anchor(to_screen(from.region.to_rect()), edge.from_side.as_deref());
            let end = anchor(to_screen(to.region.to_rect()), edge.to_side.as_deref());

            let base = if selection.contains_edge(&edge.id) {
                theme::state::SELECTED
            } else {
                theme::canvas_color(edge.color.as_deref(), theme::border::EDGE)
            };
            let color = base.gamma_multiply(state.opacity);
            painter.line_segment(
                [start, end],
                Stroke::new(theme::stroke_width::EDGE * zoom.max(0.5), color),
            );

            if self.settings.show_arrows {
                let dir = (end - start).normalized();
                let arrow_size = 10.0 * zoom.max(0.5);
                let perp = Vec2::new(-dir.y, dir.x);
                let p2 = end - dir * arrow_size + perp * arrow_size * 0.5;
                let p3 = end - dir * arrow_size - perp * arrow_size * 0.5;
                painter.add(egui::Shape::convex_polygon(
                    vec![end, p2, p3],
                    color,
                    Stroke::NONE,
                ));
            }
            edge_hits.push((edge.id.clone(), start, end));
        }

        // Content nodes
        for node in data.nodes.iter().filter(|n| !n.is_group()) {
            let state = state_of(&node.id);
            if state.hidden {
                continue;
            }
            let screen = to_screen(node.region.to_rect());
            let color = theme::canvas_color(node.color.as_deref(), theme::border::DEFAULT);
            let hovered = self.hovered.as_deref() == Some(node.id.as_str());
            painter.rect(
                screen,
                6.0 * zoom,
                theme::bg::SURFACE.gamma_multiply(state.opacity),
                node_stroke(color, state, selection.contains_node(&node.id), hovered),
            );
            painter.with_clip_rect(screen.shrink(4.0)).text(
                screen.left_top() + Vec2::splat(8.0 * zoom),
                Align2::LEFT_TOP,
                node_caption(node),
                FontId::proportional(13.0 * zoom.max(0.5)),
                theme::text::PRIMARY.gamma_multiply(state.opacity),
            );
        }

        // Hit testing: content over groups over edges
        let hit_at = |pos: Pos2| -> Option<Hit> {
            let visible = |n: &&Node| !state_of(&n.id).hidden;
            let inside = |n: &&Node| to_screen(n.region.to_rect()).contains(pos);
            if let Some(node) = data
                .nodes
                .iter()
                .rev()
                .filter(|n| !n.is_group())
                .filter(visible)
                .find(inside)
            {
                return Some(Hit::Node(node.id.clone()));
            }
            if let Some((id, _, _)) = edge_hits
                .iter()
                .find(|(_, a, b)| distance_to_segment(pos, *a, *b) <= EDGE_HIT_DISTANCE)
            {
                return Some(Hit::Edge(id.clone()));
            }
            data.nodes
                .iter()
                .rev()
                .filter(|n| n.is_group())
                .filter(visible)
                .find(inside)
                .map(|n| Hit::Node(n.id.clone()))
        };

        let hovered = hover_pos.and_then(|p| match hit_at(p) {
            Some(Hit::Node(id)) => Some(id),
            _ => None,
        });
        let clicked = if response.clicked() {
            Some(response.interact_pointer_pos().and_then(|p| hit_at(p)))
        } else {
            None
        };

        self.hovered = hovered;
        if let Some(hit) = clicked {
            let extend = ui.input(|i| i.modifiers.shift);
            if let Some(live) = self.live.as_mut() {
                match hit {
                    Some(Hit::Node(id)) => live.click_node(&id, extend),
                    Some(Hit::Edge(id)) => live.click_edge(&id, extend),
                    None if !extend => live.select(Default::default()),
                    None => {}
                }
            }
        }
    }

    fn render_picker(&mut self, ctx: &egui::Context) {
        let Some(mut state) = self.picker.take() else {
            return;
        };

        let title = match (state.pending.rule(), state.pending.is_additive()) {
            (TagMatch::Include, false) => "Filter by tag",
            (TagMatch::Exclude, false) => "Filter excluding tag",
            (TagMatch::Include, true) => "Add tag to filter",
            (TagMatch::Exclude, true) => "Add all except tag",
        };

        let mut open = true;
        let mut chosen: Option<String> = None;
        let candidates = state.pending.candidates();
        let ranked = self
            .fuzzy
            .rank(&state.query, candidates, self.settings.picker_limit);

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 80.0))
            .open(&mut open)
            .show(ctx, |ui| {
                let input = ui.add(
                    egui::TextEdit::singleline(&mut state.query).hint_text("Search tags"),
                );
                input.request_focus();

                if ranked.is_empty() {
                    ui.label(egui::RichText::new("No matching tags").color(theme::text::MUTED));
                }
                egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                    for &idx in &ranked {
                        if ui.selectable_label(false, candidates[idx].as_str()).clicked() {
                            chosen = Some(candidates[idx].clone());
                        }
                    }
                });

                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    if let Some(&first) = ranked.first() {
                        chosen = Some(candidates[first].clone());
                    }
                }
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            open = false;
        }

        if let Some(tag) = chosen {
            if let Some(live) = self.live.as_mut() {
                let shown =
                    self.filter
                        .apply_tag_choice(&state.pending, &tag, live, self.metadata.as_ref());
                self.toast(format!("{}: {} nodes shown", tag, shown));
            }
            // Additive pickers stay open for further picks
            if !state.pending.is_additive() {
                open = false;
            }
            state.query.clear();
        }

        if open {
            self.picker = Some(state);
        }
    }

    fn render_toasts(&mut self, ctx: &egui::Context) {
        self.toasts.retain(|t| t.shown_at.elapsed() < TOAST_DURATION);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-12.0, -12.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::none()
                        .fill(theme::bg::TOAST)
                        .rounding(4.0)
                        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                        .show(ui, |ui| {
                            ui.colored_label(theme::text::PRIMARY, toast.message.as_str());
                        });
                    ui.add_space(4.0);
                }
            });
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_save_settings();

        // Dark theme
        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::left("sidebar")
            .min_width(220.0)
            .frame(
                egui::Frame::none()
                    .fill(theme::bg::PANEL)
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_sidebar(ui);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::CANVAS))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });

        self.render_picker(ctx);
        self.render_toasts(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Force save settings on exit
        if self.settings_dirty {
            self.settings.start_mode = self.filter.mode();
            self.settings.save();
        }
    }
}

/// Bounding rect of all nodes, or a unit rect at the origin for an empty canvas
fn content_bounds(nodes: &[Node]) -> Rect {
    nodes
        .iter()
        .map(|n| n.region.to_rect())
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::from_min_size(Pos2::ZERO, Vec2::splat(1.0)))
}

/// Edge attachment point on a node's side
fn anchor(rect: Rect, side: Option<&str>) -> Pos2 {
    match side {
        Some("top") => rect.center_top(),
        Some("bottom") => rect.center_bottom(),
        Some("left") => rect.left_center(),
        Some("right") => rect.right_center(),
        _ => rect.center(),
    }
}

fn node_stroke(color: Color32, state: ElementState, selected: bool, hovered: bool) -> Stroke {
    let (color, width) = if selected {
        (theme::state::SELECTED, theme::stroke_width::SELECTED)
    } else if hovered {
        (theme::state::HOVER, theme::stroke_width::HOVER)
    } else {
        (color, theme::stroke_width::NORMAL)
    };
    Stroke::new(width, color.gamma_multiply(state.opacity))
}

/// First line of a node's content, shortened for display
fn node_caption(node: &Node) -> String {
    let caption = match &node.kind {
        NodeKind::Text { text } => text.lines().find(|l| !l.trim().is_empty()).unwrap_or(""),
        NodeKind::File { file, .. } => file.rsplit('/').next().unwrap_or(file),
        NodeKind::Link { url } => url,
        NodeKind::Group { .. } => node.display_label(),
    };
    truncate(caption, 60)
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
