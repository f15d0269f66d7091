// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crawler configuration: loaded from TOML, with an optional
//! `-variables <file>` overlay merged on top before the primary file parses.

use crate::error::ConfigError;
use crate::policy::{OrphanStrategy, SpoilAction};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_workers() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Identifies this crawler; used to derive the safe on-disk directory name.
    pub crawler_id: String,
    /// Root of the persisted directory layout: `<workDir>/<safeCrawlerId>/`.
    pub work_dir: PathBuf,
    /// Number of Scheduler worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// 0 means unbounded.
    #[serde(default)]
    pub max_documents: u64,
    #[serde(default)]
    pub spoil_action: SpoilAction,
    #[serde(default)]
    pub orphan_strategy: OrphanStrategy,
    #[serde(default)]
    pub enable_jmx: bool,
    /// Substrings matched against a per-reference error's `Display` output:
    /// a match re-throws after the reference finalizes, stopping the crawl
    /// instead of just marking the reference `ERROR`.
    #[serde(default)]
    pub stop_on_exceptions: Vec<String>,
    /// Root directory the bundled filesystem collector fetches from. Seed
    /// references (below) are paths relative to this directory.
    #[serde(default)]
    pub source_dir: PathBuf,
    /// Seed reference keys queued at the start of every `start` invocation
    /// (a minimal stand-in for a dedicated seed loader, out of scope here).
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl CrawlConfig {
    /// Load from `config_path`, optionally overlaying `variables_path` first
    /// (last-file-wins per key, shallow-merged at the table level).
    pub fn load(config_path: &Path, variables_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = toml::value::Table::new();

        if let Some(variables_path) = variables_path {
            let overlay = read_table(variables_path)?;
            merge_tables(&mut merged, overlay);
        }

        let primary = read_table(config_path)?;
        merge_tables(&mut merged, primary);

        let value = toml::Value::Table(merged);
        let config: CrawlConfig = value
            .try_into()
            .map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawler_id.trim().is_empty() {
            return Err(ConfigError::Invalid("crawler_id must not be empty".into()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// A filesystem-safe rendering of `crawler_id` for use as a directory name.
    pub fn safe_crawler_id(&self) -> String {
        self.crawler_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    pub fn crawler_root(&self) -> PathBuf {
        self.work_dir.join(self.safe_crawler_id())
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.crawler_root().join("downloads")
    }

    pub fn store_dir(&self) -> PathBuf {
        self.crawler_root().join("store")
    }
}

fn read_table(path: &Path) -> Result<toml::value::Table, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        toml::Value::Table(table) => Ok(table),
        _ => Ok(toml::value::Table::new()),
    }
}

fn merge_tables(base: &mut toml::value::Table, overlay: toml::value::Table) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
