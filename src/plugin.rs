#![forbid(unsafe_code)]

//! Compiled-in plugins that contribute named commands.
//!
//! A plugin only gets to register commands when its name appears in the
//! `[plugins] enabled` list of the config file. Nothing is loaded from disk.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Entry, PaneId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("command `{0}` is already registered")]
    Duplicate(String),
    #[error("{0}")]
    Failed(String),
}

/// What a plugin command sees of the application.
pub struct PluginContext<'a> {
    pub pane: PaneId,
    pub targets: &'a [Entry],
    pub destination: Option<&'a Path>,
}

pub type CommandFn = Box<dyn Fn(&PluginContext<'_>) -> Result<String, PluginError>>;

struct RegisteredCommand {
    plugin: &'static str,
    label: String,
    run: CommandFn,
}

pub trait Plugin {
    fn name(&self) -> &'static str;
    fn register_commands(&self, registry: &mut CommandRegistry) -> Result<(), PluginError>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, RegisteredCommand>,
    current_plugin: &'static str,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every plugin from `catalog` whose name is in `enabled`.
    pub fn from_manifest(catalog: Vec<Box<dyn Plugin>>, enabled: &[String]) -> Self {
        let mut registry = Self::new();
        for name in enabled {
            let Some(plugin) = catalog.iter().find(|p| p.name() == name.as_str()) else {
                warn!(plugin = %name, "unknown plugin in manifest, skipped");
                continue;
            };
            registry.current_plugin = plugin.name();
            match plugin.register_commands(&mut registry) {
                Ok(()) => debug!(plugin = plugin.name(), "plugin registered"),
                Err(err) => warn!(plugin = plugin.name(), "plugin registration failed: {err}"),
            }
        }
        registry.current_plugin = "";
        registry
    }

    pub fn register<F>(&mut self, name: &str, label: &str, run: F) -> Result<(), PluginError>
    where
        F: Fn(&PluginContext<'_>) -> Result<String, PluginError> + 'static,
    {
        if self.commands.contains_key(name) {
            return Err(PluginError::Duplicate(name.to_string()));
        }
        self.commands.insert(
            name.to_string(),
            RegisteredCommand {
                plugin: self.current_plugin,
                label: label.to_string(),
                run: Box::new(run),
            },
        );
        Ok(())
    }

    pub fn run(&self, name: &str, ctx: &PluginContext<'_>) -> Result<String, PluginError> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| PluginError::UnknownCommand(name.to_string()))?;
        debug!(command = name, plugin = command.plugin, "running plugin command");
        (command.run)(ctx)
    }

    /// `(name, label)` pairs in name order.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands
            .iter()
            .map(|(name, cmd)| (name.as_str(), cmd.label.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![Box::new(SamplePlugin), Box::new(SelectionInfoPlugin)]
}

struct SamplePlugin;

impl Plugin for SamplePlugin {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn register_commands(&self, registry: &mut CommandRegistry) -> Result<(), PluginError> {
        registry.register(
            "sample.hello",
            "Sample plugin action",
            |_ctx| Ok("Hello from the sample plugin!".to_string()),
        )
    }
}

struct SelectionInfoPlugin;

impl Plugin for SelectionInfoPlugin {
    fn name(&self) -> &'static str {
        "selection-info"
    }

    fn register_commands(&self, registry: &mut CommandRegistry) -> Result<(), PluginError> {
        registry.register(
            "selection.size",
            "Size of the current targets",
            |ctx| {
                if ctx.targets.is_empty() {
                    return Err(PluginError::Failed("nothing selected".to_string()));
                }
                let bytes: u64 = ctx.targets.iter().map(|e| e.size).sum();
                let mut text = format!(
                    "{} item(s) in {} pane, {} bytes",
                    ctx.targets.len(),
                    ctx.pane.label(),
                    bytes
                );
                if let Some(dest) = ctx.destination {
                    text.push_str(&format!(", target {}", dest.display()));
                }
                Ok(text)
            },
        )
    }
}
