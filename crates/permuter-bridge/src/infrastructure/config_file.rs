//! Optional TOML configuration file.
//!
//! Every key is optional; whatever the file sets replaces the built-in
//! default, and CLI flags later replace the file.
//!
//! ```toml
//! bind = "127.0.0.1:25333"
//!
//! [solver]
//! program = "java"
//! args = ["-jar", "/opt/solver/permuter-solver.jar"]
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::BridgeConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of a config file, with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<SocketAddr>,
    #[serde(default)]
    pub solver: FileSolverConfig,
}

/// The `[solver]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSolverConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

impl FileConfig {
    /// Overwrites the fields of `config` that this file sets.
    pub fn apply_to(self, config: &mut BridgeConfig) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(program) = self.solver.program {
            config.solver.program = program;
        }
        if let Some(args) = self.solver.args {
            config.solver.args = args;
        }
    }
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (a missing file is
/// an error: the path was given explicitly) and [`ConfigError::Parse`] if the
/// TOML is malformed or has unknown keys.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
