use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::flow::FlowParams;
use crate::graph::view::{MAX_ZOOM, MIN_ZOOM};
use crate::graph::SimParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Network,
    Flow,
}

impl ViewMode {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        match input {
            "network" => Ok(Self::Network),
            "flow" => Ok(Self::Flow),
            _ => anyhow::bail!("invalid view: {input} (expected network|flow)"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Flow => "Flow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub view_mode: ViewMode,
    pub records_path: Option<PathBuf>,
    pub watch_records: bool,
    pub playback_step_days: u64,
    pub playback_interval_ms: u64,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub simulation: SimParams,
    pub flow: FlowParams,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Network,
            records_path: None,
            watch_records: true,
            playback_step_days: 1,
            playback_interval_ms: 250,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            simulation: SimParams::default(),
            flow: FlowParams::default(),
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "leadgraph")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

pub fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "invalid viewer config, using defaults");
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

pub fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}
