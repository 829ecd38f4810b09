use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::WordDeckApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop form for adding vocabulary notes through the relay")]
struct Args {
    /// Base URL of the relay server.
    #[arg(long, default_value = "http://127.0.0.1:8088")]
    server_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(args.server_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("worddeck")
            .with_inner_size([420.0, 380.0])
            .with_min_inner_size([360.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "worddeck",
        options,
        Box::new(|cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(ui::app::SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<ui::app::PersistedSettings>(&text).ok())
            });
            Ok(Box::new(WordDeckApp::new(
                cmd_tx,
                ui_rx,
                args.server_url,
                persisted,
            )))
        }),
    )
}
