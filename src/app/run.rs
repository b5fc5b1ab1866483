//! Top-level entry point for running the AOI map as a native window.

use eframe::egui;

use crate::config::AoiMapConfig;

use super::AoiApp;

/// Launch the AOI map application in a native window.
///
/// Applies the configuration, installs the icon font, restores persisted
/// state from eframe storage, and enters the eframe event loop. The call
/// blocks until the window is closed.
pub fn run_aoimap(mut config: AoiMapConfig) -> eframe::Result<()> {
    let title = config.title.clone();
    let mut options = config.native_options.take().unwrap_or_default();

    // Try to set the application icon from icon.svg if available.
    if options.viewport.icon.is_none() {
        if let Some(icon) = load_app_icon_svg() {
            options.viewport = options.viewport.clone().with_icon(icon);
        }
    }

    if options.viewport.inner_size.is_none() {
        options.viewport = options
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1400.0, 900.0));
    }

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            // Install the Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(AoiApp::new(config, cc.storage)))
        }),
    )
}

/// Attempt to load the project's `icon.svg` as an [`egui::IconData`].
///
/// Returns `None` if the file does not exist or cannot be parsed/rendered.
fn load_app_icon_svg() -> Option<egui::IconData> {
    let svg_path = concat!(env!("CARGO_MANIFEST_DIR"), "/icon.svg");
    let data = std::fs::read(svg_path).ok()?;

    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_data(&data, &opt).ok()?;
    let size = tree.size().to_int_size();
    if size.width() == 0 || size.height() == 0 {
        return None;
    }
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())?;
    let mut canvas = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::default(), &mut canvas);
    let rgba = pixmap.take();
    Some(egui::IconData {
        rgba,
        width: size.width(),
        height: size.height(),
    })
}
