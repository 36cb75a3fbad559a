#![forbid(unsafe_code)]

mod app;
mod config;
mod controller;
mod cursor;
mod error;
mod fs_ops;
mod keymap;
mod model;
mod pane;
mod plugin;
mod reader;
mod resolver;
mod selection;
mod snapshot;
mod ui;
mod vfs;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{info, warn};

use crate::app::App;
use crate::config::Config;
use crate::controller::DualPaneController;
use crate::fs_ops::LocalFileOps;
use crate::model::PaneId;
use crate::plugin::{CommandRegistry, builtin_plugins};
use crate::reader::LocalReader;
use crate::ui::RedrawFlag;

const DEFAULT_LOG_PATH: &str = "/tmp/gxplorer.log";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config_path = Config::config_path();
    let config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::default(),
    };

    let dirty = RedrawFlag::new();
    let mut controller = DualPaneController::new(
        config.start_dir(PaneId::Left),
        config.start_dir(PaneId::Right),
        config.listing_options(),
        Box::new(LocalReader),
        Box::new(dirty.clone()),
    );
    if let Err(err) = controller.refresh_all() {
        warn!("initial listing failed: {err}");
    }
    let plugins = CommandRegistry::from_manifest(builtin_plugins(), &config.plugins.enabled);
    info!(commands = plugins.commands().count(), "starting");

    let mut app = App::new(controller, Box::new(LocalFileOps), config, config_path, plugins);
    ui::run(&mut app, dirty).context("terminal session failed")?;
    info!("exiting");
    Ok(())
}

/// File logging only when `GX_DEBUG_LOG` is set; its value names the file.
fn init_logging() -> anyhow::Result<()> {
    let Ok(target) = std::env::var("GX_DEBUG_LOG") else {
        return Ok(());
    };
    let path = if target.is_empty() || target == "1" {
        PathBuf::from(DEFAULT_LOG_PATH)
    } else {
        PathBuf::from(target)
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}
