use anyhow::{Context, Result};
use mworkers_watch::{PipelineConfig, WatchEvents};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Cli;

/// On-disk configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl FileConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

/// Resolve the effective pipeline configuration: flags > file > defaults.
pub fn resolve(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::load(path)?.pipeline,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, cli: &Cli) {
    if let Some(workers) = cli.workers {
        config.workers = workers.get();
    }
    if let Some(dir) = &cli.dir {
        config.watch_dir = dir.clone();
    }
    if let Some(capacity) = cli.queue_capacity {
        config.queue_capacity = Some(capacity.get());
    }
    if let Some(delay) = cli.task_delay_ms {
        config.task_delay_ms = delay;
    }
    if cli.all_closes {
        config.events = WatchEvents::Close;
    }
    if cli.drain {
        config.drain_on_eof = true;
    }
}
