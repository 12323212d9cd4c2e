// src/config.rs
//! Run configuration: data directory, shortlist size, file name and weight
//! overrides. Read from TOML or JSON; every field is optional.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::rank::DEFAULT_TOP_K;
use crate::role::Role;
use crate::scoring::{RoleFormula, ScoringTable};
use crate::source::Source;

pub const ENV_CONFIG_PATH: &str = "RANKER_CONFIG_PATH";
pub const ENV_DATA_DIR: &str = "RANKER_DATA_DIR";
pub const ENV_TOP_K: &str = "RANKER_TOP_K";

pub const DEFAULT_CONFIG_TOML: &str = "config/ranker.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/ranker.json";

/// `weights.<source>.<role>.<feature> = weight`
pub type WeightOverrides = BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Directory the per-source CSV files are read from.
    pub data_dir: PathBuf,
    pub top_k: usize,
    /// Source name → file name (relative to `data_dir`, or absolute).
    pub files: BTreeMap<String, String>,
    /// Replacement formulas; a role listed here replaces the default formula
    /// for that role entirely.
    pub weights: WeightOverrides,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            top_k: DEFAULT_TOP_K,
            files: BTreeMap::new(),
            weights: BTreeMap::new(),
        }
    }
}

impl RankerConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading ranker config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing ranker config {}", path.display()))
    }

    /// Lookup order:
    /// 1) $RANKER_CONFIG_PATH
    /// 2) config/ranker.toml
    /// 3) config/ranker.json
    /// 4) built-in defaults
    ///
    /// `$RANKER_DATA_DIR` and `$RANKER_TOP_K` are applied on top.
    pub fn load_default() -> anyhow::Result<Self> {
        let mut cfg = Self::locate()?;
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// An explicit path wins over the default lookup; env overrides apply either way.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(p) => {
                let mut cfg = Self::load_from(p)?;
                cfg.apply_env()?;
                Ok(cfg)
            }
            None => Self::load_default(),
        }
    }

    fn locate() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from(DEFAULT_CONFIG_TOML);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_CONFIG_JSON);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(k) = std::env::var(ENV_TOP_K) {
            self.top_k = k
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TOP_K}='{k}' is not a positive integer"))?;
        }
        Ok(())
    }

    /// File overrides keyed by parsed source name.
    pub fn file_overrides(&self) -> Result<BTreeMap<Source, PathBuf>> {
        self.files
            .iter()
            .map(|(name, file)| name.parse::<Source>().map(|s| (s, PathBuf::from(file))))
            .collect()
    }

    /// Default formulas with the configured overrides applied and validated.
    pub fn scoring_table(&self) -> Result<ScoringTable> {
        let mut table = ScoringTable::default();
        for (source_name, roles) in &self.weights {
            let source: Source = source_name.parse()?;
            for (role_name, terms) in roles {
                let role: Role = role_name.parse()?;
                let formula = RoleFormula::new(terms.iter().map(|(f, w)| (f.as_str(), *w)));
                table = table.with_formula(source, role, formula)?;
            }
        }
        Ok(table)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(PipelineError::Config("top_k must be at least 1".into()));
        }
        self.file_overrides()?;
        self.scoring_table()?;
        Ok(())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> anyhow::Result<RankerConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = serde_json::from_str(s) {
                return Ok(v);
            }
            toml::from_str(s).map_err(|e| anyhow!("unsupported ranker config format: {e}"))
        }
    }
}
