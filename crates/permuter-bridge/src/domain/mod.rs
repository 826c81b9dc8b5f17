//! Domain layer for permuter-bridge.
//!
//! Plain configuration types with no I/O.  The infrastructure layer fills
//! them in from the CLI, the environment, and the optional TOML file.

pub mod config;

pub use config::{BridgeConfig, SolverCommand, DEFAULT_PORT};
