mod backend;
mod core;
mod engine;
mod gui;
mod persistence;

use gui::app::TandemApp;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Tandem")
            .with_inner_size([760.0, 820.0])
            .with_min_inner_size([420.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native("Tandem", options, Box::new(|cc| Ok(Box::new(TandemApp::new(cc)))))
}
