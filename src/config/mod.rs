//! Threshold configuration.
//!
//! A flat numeric/bool surface merged from defaults, a TOML file
//! (`treeline.toml` or `.treeline/treeline.toml`), and `TREELINE_`-prefixed
//! environment variables. The documented `SCREAMING_CASE` key names are
//! accepted as aliases so a config written against the reference key names
//! loads unchanged.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Config file locations probed in order; later files win.
pub const CONFIG_FILES: &[&str] = &["treeline.toml", ".treeline/treeline.toml"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "MAX_CYCLOMATIC_COMPLEXITY")]
    pub max_cyclomatic_complexity: u32,
    #[serde(alias = "MAX_COGNITIVE_COMPLEXITY")]
    pub max_cognitive_complexity: u32,
    #[serde(alias = "MAX_PARAMS")]
    pub max_params: usize,
    #[serde(alias = "MAX_LINE_LENGTH")]
    pub max_line_length: usize,
    #[serde(alias = "MAX_FILE_LINES")]
    pub max_file_lines: usize,
    #[serde(alias = "MAX_FUNCTION_LINES")]
    pub max_function_lines: u32,
    #[serde(alias = "MAX_DUPLICATED_LINES")]
    pub max_duplicated_lines: usize,
    #[serde(alias = "MIN_CORE_DEGREE")]
    pub min_core_degree: usize,
    #[serde(alias = "MIN_FLOW_CALLS")]
    pub min_flow_calls: usize,
    /// How far back (in lines) an issue may attach to a definition.
    #[serde(alias = "ISSUE_ATTACH_WINDOW")]
    pub issue_attach_window: u32,
    #[serde(alias = "WORKERS")]
    pub workers: usize,
    #[serde(alias = "CACHE_ENABLED")]
    pub cache_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cyclomatic_complexity: 10,
            max_cognitive_complexity: 15,
            max_params: 5,
            max_line_length: 80,
            max_file_lines: 500,
            max_function_lines: 30,
            max_duplicated_lines: 5,
            min_core_degree: 2,
            min_flow_calls: 2,
            issue_attach_window: 100,
            workers: 4,
            cache_enabled: true,
        }
    }
}

impl Config {
    /// Merge defaults, the standard config files, and the environment.
    pub fn load_default() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        for file in CONFIG_FILES {
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(Env::prefixed("TREELINE_"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Load an explicitly named config file; missing files are an error
    /// here, unlike the probed defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("TREELINE_"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))
    }
}
