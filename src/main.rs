//! Canvas Filter
//!
//! Desktop viewer for `.canvas` files with selection, color, tag, and
//! reachability filters.

mod app;

use eframe::egui;
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let canvas_arg = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Canvas Filter"),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "Canvas Filter",
        options,
        Box::new(|cc| Ok(Box::new(app::CanvasApp::new(cc, canvas_arg)))),
    )
}
