use anyhow::Result;
use eframe::egui;

mod app;
mod core;
mod messaging;
mod ui;

fn main() -> Result<()> {
    env_logger::init();
    println!("[MAIN] Starting Clavier MIDI keyboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1240.0, 330.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Clavier",
        options,
        Box::new(|_cc| {
            let app = match app::KeyboardApp::new() {
                Ok(app) => app,
                Err(e) => {
                    eprintln!("[MAIN] Failed to create app: {}", e);
                    std::process::exit(1);
                }
            };
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("[MAIN] Application error: {}", e))
}
