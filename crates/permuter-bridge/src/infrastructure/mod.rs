//! Infrastructure layer for permuter-bridge.
//!
//! Everything that touches the outside world lives here:
//!
//! - `server` binds the call socket and runs one task per connection
//! - `client` is the caller's side of the same socket
//! - `solver_process` launches the external solver for each call
//! - `config_file` reads the optional TOML configuration
//!
//! # What does NOT belong here?
//!
//! - What a call does with its arguments (that is the application layer)
//! - Wire encoding (that is `permuter-core`)

pub mod client;
pub mod config_file;
pub mod server;
pub mod solver_process;

pub use client::{BridgeClient, ClientError};
pub use config_file::{load_file, ConfigError, FileConfig};
pub use server::{handle_connection, BridgeServer, ServerError};
pub use solver_process::{ProcessSolver, ProcessSolverFactory};
