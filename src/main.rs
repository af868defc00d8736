use anyhow::Context;
use log::{error, info, LevelFilter};
use matrixclock::{
    config::Config,
    display::{canvas::FramebufferPanel, MatrixDisplay},
    platform::DevicePlatform,
    scheduler::Scheduler,
};
use std::process;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("matrixclock", LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::load()?;
    let panel = FramebufferPanel::new(config.framebuffer.clone());

    // Blank the panel on the way out, so we don't leave a stale frame lit
    let mut exit_panel = panel.clone();
    let (width, height) = (config.display_width, config.display_height);
    ctrlc::set_handler(move || {
        info!("Shutting down");
        if let Err(err) = exit_panel.blank(width, height) {
            error!("Error blanking panel: {err:?}");
        }
        process::exit(0);
    })
    .context("Error setting exit handler")?;

    let display = MatrixDisplay::new(&config, panel);
    let platform = DevicePlatform::new(&config)?;
    Scheduler::new(&config, platform, display).run()
}
