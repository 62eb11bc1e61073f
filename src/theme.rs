//! Color constants for the canvas viewer.
//!
//! Node and edge colors come from the canvas file (presets `"1"`..`"6"` or
//! `#rrggbb`); everything else is sourced from here.

use egui::Color32;

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Canvas area background - darkest layer
    pub const CANVAS: Color32 = Color32::from_rgb(14, 17, 23);

    /// Panel backgrounds - slightly lighter than canvas
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Card/node surface backgrounds
    pub const SURFACE: Color32 = Color32::from_rgb(28, 30, 38);

    /// Toast background
    pub const TOAST: Color32 = Color32::from_rgb(35, 38, 48);
}

/// Accent colors
pub mod accent {
    use super::*;

    pub const ORANGE: Color32 = Color32::from_rgb(255, 149, 0);

    pub const CYAN: Color32 = Color32::from_rgb(6, 182, 212);

    pub const GREEN: Color32 = Color32::from_rgb(34, 197, 94);

    pub const PURPLE: Color32 = Color32::from_rgb(155, 89, 182);

    pub const RED: Color32 = Color32::from_rgb(239, 68, 68);

    /// Selection highlighting
    pub const YELLOW: Color32 = Color32::from_rgb(255, 220, 80);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    pub const SECONDARY: Color32 = Color32::from_rgb(180, 180, 190);

    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);
}

/// Border colors
pub mod border {
    use super::*;

    /// Default node border when the node has no color
    pub const DEFAULT: Color32 = Color32::from_rgb(85, 90, 100);

    /// Edge color when the edge has no color
    pub const EDGE: Color32 = Color32::from_rgb(130, 135, 145);
}

/// State colors for interactive elements
pub mod state {
    use super::*;

    pub const HOVER: Color32 = Color32::WHITE;

    pub const SELECTED: Color32 = super::accent::YELLOW;

    /// Active mode badge: fade
    pub const FADE: Color32 = super::accent::CYAN;

    /// Active mode badge: hide
    pub const HIDE: Color32 = super::accent::ORANGE;
}

/// Stroke widths
pub mod stroke_width {
    pub const NORMAL: f32 = 1.0;

    pub const HOVER: f32 = 2.0;

    pub const SELECTED: f32 = 2.5;

    pub const EDGE: f32 = 1.5;
}

/// Resolve a canvas color attribute, falling back to `default` when absent
/// or unparsable.
pub fn canvas_color(color: Option<&str>, default: Color32) -> Color32 {
    match color.map(str::trim) {
        Some("1") => accent::RED,
        Some("2") => accent::ORANGE,
        Some("3") => accent::YELLOW,
        Some("4") => accent::GREEN,
        Some("5") => accent::CYAN,
        Some("6") => accent::PURPLE,
        Some(hex) if hex.starts_with('#') => parse_hex(&hex[1..]).unwrap_or(default),
        _ => default,
    }
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_map_to_accents() {
        assert_eq!(canvas_color(Some("1"), border::DEFAULT), accent::RED);
        assert_eq!(canvas_color(Some("5"), border::DEFAULT), accent::CYAN);
    }

    #[test]
    fn hex_colors_are_parsed() {
        assert_eq!(
            canvas_color(Some("#10ff80"), border::DEFAULT),
            Color32::from_rgb(0x10, 0xff, 0x80)
        );
    }

    #[test]
    fn absent_or_bad_colors_fall_back() {
        assert_eq!(canvas_color(None, border::DEFAULT), border::DEFAULT);
        assert_eq!(canvas_color(Some(""), border::DEFAULT), border::DEFAULT);
        assert_eq!(canvas_color(Some("#12"), border::DEFAULT), border::DEFAULT);
        assert_eq!(canvas_color(Some("#zzzzzz"), border::DEFAULT), border::DEFAULT);
        assert_eq!(canvas_color(Some("7"), border::DEFAULT), border::DEFAULT);
    }
}
