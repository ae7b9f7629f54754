mod app;
mod ui;

use iced::{window, Size};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    iced::application(app::DownloadApp::new, app::update, app::view)
        .title("Video Downloader - Universal")
        .window(window::Settings {
            size: Size::new(800.0, 650.0),
            resizable: true,
            ..Default::default()
        })
        .run()
}
