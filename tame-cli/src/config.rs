//! Configuration file loading for tame.
//!
//! Discovers and loads `tame.toml` from the workspace root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tame_types::{DependencySection, ReconcileMode};
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "tame.toml";

/// Top-level configuration from tame.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TameConfig {
    pub reconcile: ReconcileConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// `pin` (default) or `reference`.
    pub mode: Option<ReconcileMode>,

    /// Dependency sections to reconcile. Absent means all four.
    pub sections: Option<Vec<DependencySection>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Worker threads for parsing and writing manifests.
    pub jobs: Option<usize>,

    /// Extra glob patterns excluded from membership.
    pub exclude: Vec<String>,
}

/// Discover the tame.toml config file in the workspace root.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a tame.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<TameConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<TameConfig> {
    let config: TameConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the workspace root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<TameConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(TameConfig::default()),
    }
}

/// Settings after merging tame.toml with CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub mode: ReconcileMode,
    pub sections: Vec<DependencySection>,
    pub jobs: Option<usize>,
    pub exclude: Vec<String>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: TameConfig,
}

impl ConfigMerger {
    pub fn new(config: TameConfig) -> Self {
        Self { config }
    }

    /// CLI `mode` and `jobs` replace the file's values; CLI `exclude`
    /// patterns extend the file's list.
    pub fn merge(
        self,
        cli_mode: Option<ReconcileMode>,
        cli_jobs: Option<usize>,
        cli_exclude: &[String],
    ) -> MergedConfig {
        let mut exclude = self.config.scan.exclude;
        for pattern in cli_exclude {
            if !exclude.contains(pattern) {
                exclude.push(pattern.clone());
            }
        }

        MergedConfig {
            mode: cli_mode.or(self.config.reconcile.mode).unwrap_or_default(),
            sections: self
                .config
                .reconcile
                .sections
                .unwrap_or_else(|| DependencySection::ALL.to_vec()),
            jobs: cli_jobs.or(self.config.scan.jobs),
            exclude,
        }
    }
}
