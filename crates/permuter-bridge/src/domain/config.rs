//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! `main.rs` layers it from three sources: built-in defaults, then the
//! optional TOML file, then CLI flags and their environment variables.

use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Port the bridge listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 25333;

/// Program run for each call when no solver is configured.
pub const DEFAULT_SOLVER_PROGRAM: &str = "permuter-solver";

/// How to launch the external solver for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverCommand {
    /// Executable name or path, resolved through `PATH` like any command.
    pub program: String,
    /// Arguments passed before any request data.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SolverCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_SOLVER_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

/// All runtime configuration for the bridge.
///
/// # Example
///
/// ```rust
/// use permuter_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 25333);
/// assert!(cfg.is_loopback());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Address the call socket binds to.
    ///
    /// The channel has no authentication, so anything other than a loopback
    /// address exposes the solver to the network.
    pub bind_addr: SocketAddr,

    /// The solver launched once per call.
    pub solver: SolverCommand,
}

impl BridgeConfig {
    /// Returns `true` if [`bind_addr`](Self::bind_addr) only accepts local peers.
    pub fn is_loopback(&self) -> bool {
        self.bind_addr.ip().is_loopback()
    }
}

impl Default for BridgeConfig {
    /// | Field      | Default             |
    /// |------------|---------------------|
    /// | bind_addr  | `127.0.0.1:25333`   |
    /// | solver     | `permuter-solver`   |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            solver: SolverCommand::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
