use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Tunable search parameters for the fish engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOpts {
    /// Iterative-deepening limit used when no time budget is set.
    pub depth: u32,
    /// Number of ranked variations to track.
    pub pvs: u32,
    /// Time budget in milliseconds; overrides `depth` when present.
    pub movetime_ms: Option<u64>,
}

impl Default for SearchOpts {
    fn default() -> Self {
        Self { depth: 12, pvs: 1, movetime_ms: None }
    }
}

/// Engine runtime binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct Engines {
    pub zero: PathBuf,
    pub fish: PathBuf,
}

/// Neural network weights loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct NetConfig {
    pub name: String,
    pub path: PathBuf,
}

/// Startup configuration, usually loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub engines: Engines,
    #[serde(default)]
    pub net: Option<NetConfig>,
    #[serde(default)]
    pub search: SearchOpts,
    /// Search command sent by `go_zero`. The default single-node lookup is a
    /// placeholder until the zero nets carry a real search.
    #[serde(default = "default_zero_go")]
    pub zero_go: String,
    /// Directory where `set_net` spools weight bytes before handing the
    /// path to the zero engine. Defaults to the system temp directory.
    #[serde(default)]
    pub weights_dir: Option<PathBuf>,
}

pub(crate) fn default_zero_go() -> String {
    "go nodes 1".to_string()
}

impl Config {
    /// Minimal configuration for the given engine binaries.
    pub fn with_engines(zero: PathBuf, fish: PathBuf) -> Self {
        Self {
            engines: Engines { zero, fish },
            net: None,
            search: SearchOpts::default(),
            zero_go: default_zero_go(),
            weights_dir: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)
            .map_err(|source| Error::Config { path: path.to_path_buf(), source })?;
        toml::from_str(&raw)
            .map_err(|source| Error::ConfigParse { path: path.to_path_buf(), source })
    }
}
