//! Run configuration: a TOML file deserialised with `serde`, the same
//! serde-first approach the corpus index and download log already use for
//! their on-disk formats. CLI flags override config-file values
//! field-by-field.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PolicyConfig {
    Random { rng_seed: u64 },
    Bfs,
    Dfs,
    QualityHeap,
    QualityUpdating { max_stale: Option<u64> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SeedConfig {
    List { path: PathBuf },
    Random { n: usize, rng_seed: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub corpus_index: PathBuf,
    pub outlinks_dir: PathBuf,
    pub inlinks_dir: Option<PathBuf>,
    pub qscores_path: Option<PathBuf>,
    pub policy: PolicyConfig,
    pub seeds: SeedConfig,
    #[serde(default)]
    pub max_pages: u64,
    pub save_every_n_pages: u64,
    pub download_log_prefix: PathBuf,
    pub seeds_sidecar: PathBuf,
    pub bitmap_capacity: Option<u64>,
    #[serde(default)]
    pub oracle_quality: bool,
}

impl RunConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        toml::from_str(&text).map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))
    }
}

/// CLI-flag overrides applied field-by-field on top of a loaded RunConfig.
/// Every field is optional; `None` leaves the config-file value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_pages: Option<u64>,
    pub save_every_n_pages: Option<u64>,
    pub download_log_prefix: Option<PathBuf>,
    pub seeds_sidecar: Option<PathBuf>,
    pub bitmap_capacity: Option<u64>,
    pub oracle_quality: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(v) = self.max_pages {
            config.max_pages = v;
        }
        if let Some(v) = self.save_every_n_pages {
            config.save_every_n_pages = v;
        }
        if let Some(v) = self.download_log_prefix.clone() {
            config.download_log_prefix = v;
        }
        if let Some(v) = self.seeds_sidecar.clone() {
            config.seeds_sidecar = v;
        }
        if let Some(v) = self.bitmap_capacity {
            config.bitmap_capacity = Some(v);
        }
        if let Some(v) = self.oracle_quality {
            config.oracle_quality = v;
        }
        config
    }
}
