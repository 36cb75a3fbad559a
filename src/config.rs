#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{PaneId, SortMode};
use crate::resolver;
use crate::snapshot::ListingOptions;

/// Application configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeConfig,
    pub panes: PanesConfig,
    pub listing: ListingConfig,
    pub plugins: PluginsConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    /// "dark" or "light"
    pub mode: String,
}

/// Start directories; unset panes open in the home directory.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct PanesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct ListingConfig {
    pub show_hidden: bool,
    pub sort: SortMode,
    pub dirs_first: bool,
}

/// The plugin manifest: only built-in plugins named here are registered.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PluginsConfig {
    pub enabled: Vec<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            mode: "dark".to_string(),
        }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        PluginsConfig {
            enabled: vec!["sample".to_string()],
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gxplorer")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Missing file means defaults; unreadable or malformed files are
    /// reported and also fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), "invalid config, using defaults: {err}");
                    Config::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), "cannot read config, using defaults: {err}");
                Config::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Flip between dark and light; returns the new mode.
    pub fn toggle_theme(&mut self) -> &str {
        self.theme.mode = if self.theme.mode == "dark" {
            "light".to_string()
        } else {
            "dark".to_string()
        };
        &self.theme.mode
    }

    pub fn listing_options(&self) -> ListingOptions {
        ListingOptions {
            sort_mode: self.listing.sort,
            dirs_first: self.listing.dirs_first,
            show_hidden: self.listing.show_hidden,
        }
    }

    /// The configured start directory, resolved against home (`~`, relative
    /// paths, `.` and `..`). Falls back to home when unset or unusable.
    pub fn start_dir(&self, pane: PaneId) -> PathBuf {
        let home = resolver::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let configured = match pane {
            PaneId::Left => self.panes.left.as_deref(),
            PaneId::Right => self.panes.right.as_deref(),
        };
        let Some(configured) = configured else {
            return home;
        };
        match resolver::resolve_dir_path(configured, &home) {
            Ok(dir) => dir,
            Err(err) => {
                warn!(pane = pane.label(), "start directory ignored: {err}");
                home
            }
        }
    }
}
