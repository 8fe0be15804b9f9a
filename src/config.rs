use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

use crate::{engine::EngineKind, error::ConfigError, transport::Encoding};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "GSNARK_CONFIG";

/// Settings for one run. The defaults are the fixed demonstration: prove
/// knowledge of `x = 3` with `x^3 + x + 5 = 35`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub engine: EngineKind,
    pub vk_path: PathBuf,
    pub proof_path: PathBuf,
    pub encoding: Encoding,
    /// Private witness.
    pub x: i64,
    /// Public claim.
    pub out: i64,
    /// Fixed RNG seed; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            vk_path: PathBuf::from("vk_data"),
            proof_path: PathBuf::from("proof_data"),
            encoding: Encoding::default(),
            x: 3,
            out: 35,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the file named by [`CONFIG_ENV`], or falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
