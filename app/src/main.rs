use eframe::egui;
use std::path::PathBuf;

mod app;
mod command;
mod config;
mod shortcut;
mod ui;

use config::{TomlSettings, WindowSettings};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = TomlSettings::load();
    if let Some(path) = settings.path() {
        log::debug!("Settings file: {}", path.display());
    }
    let window = WindowSettings::load(&settings);

    // Optional project directory, used by the "save next to project" preference
    let project_directory = std::env::args_os().nth(1).map(PathBuf::from);

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([window.width, window.height])
        .with_min_inner_size([240.0, 320.0]);
    if window.always_on_top {
        viewport = viewport.with_always_on_top();
    }

    eframe::run_native(
        "Animation Timer",
        eframe::NativeOptions {
            viewport,
            ..Default::default()
        },
        Box::new(move |cc| {
            Ok(Box::new(app::TimerApp::new(
                cc,
                settings,
                window,
                project_directory,
            )))
        }),
    )
}
