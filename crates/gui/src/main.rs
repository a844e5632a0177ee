mod app;
pub mod i18n;
mod ui;
mod viewport;

// Re-export library modules so that `crate::tree`, `crate::session`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use partview_lib::config;
pub use partview_lib::fixtures;
pub use partview_lib::mesh;
pub use partview_lib::render;
pub use partview_lib::session;
pub use partview_lib::tree;

use app::PartViewApp;
use config::ViewerSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partview=info,partview_lib=info".into()),
        )
        .init();

    let settings = ViewerSettings::load(parse_config_arg().as_deref());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("partview")
            .with_inner_size([settings.window.width, settings.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "partview",
        native_options,
        Box::new(move |cc| Ok(Box::new(PartViewApp::new(cc, settings)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_config_arg() -> Option<std::path::PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(std::path::PathBuf::from)
}
