mod app;
mod config;
mod force_feedback;
mod input;
mod ui;

use app::JoyTestApp;
use config::Settings;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 500.0])
            .with_min_inner_size([600.0, 500.0])
            .with_title("JoyTest"),
        ..Default::default()
    };

    eframe::run_native(
        "JoyTest",
        native_options,
        Box::new(move |cc| Ok(Box::new(JoyTestApp::new(cc, settings)))),
    )
}
